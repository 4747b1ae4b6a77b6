//! Generic campaign stacking: BAR -> net by walking the campaign list, net -> BAR by numeric search.
//!
//! ADDITIVE campaigns are taken against the original BAR while PROGRESSIVE campaigns compound on the
//! running price. Because the unknown BAR appears inside every additive term, a mixed list has no
//! closed-form inverse and [`bar_from_net`] bisects instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::campaign::{CalcType, Campaign};
use crate::pricing::validator::StackValidation;
use crate::pricing::{clamp_percent, fraction, round_to_unit, MAX_TOTAL_DISCOUNT_PCT, ONE_HUNDRED};

/// Number of bisection rounds used by [`bar_from_net`].
pub const SEARCH_ITERATIONS: usize = 20;

/// Upper bracket of the search as a multiple of the target net.
pub const SEARCH_UPPER_FACTOR: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownStep {
    pub stage_name: String,
    pub price_before: Decimal,
    pub discount_amount: Decimal,
    pub price_after: Decimal,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetQuote {
    pub net: Decimal,
    pub trace: Vec<BreakdownStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub bar_price: Decimal,
    pub net_revenue: Decimal,
    pub trace: Vec<BreakdownStep>,
}

pub trait StackingEngine: Send + Sync {
    fn net_from_bar(&self, bar_price: Decimal, campaigns: &[Campaign]) -> NetQuote;
    fn bar_from_net(&self, target_net: Decimal, campaigns: &[Campaign]) -> Decimal;

    fn breakdown(&self, bar_price: Decimal, campaigns: &[Campaign]) -> PricingBreakdown {
        let NetQuote { net, trace } = self.net_from_bar(bar_price, campaigns);
        PricingBreakdown { bar_price, net_revenue: net, trace }
    }
}

#[derive(Default)]
pub struct DeterministicStackingEngine;

impl StackingEngine for DeterministicStackingEngine {
    fn net_from_bar(&self, bar_price: Decimal, campaigns: &[Campaign]) -> NetQuote {
        net_from_bar(bar_price, campaigns)
    }

    fn bar_from_net(&self, target_net: Decimal, campaigns: &[Campaign]) -> Decimal {
        bar_from_net(target_net, campaigns)
    }
}

fn ordered(campaigns: &[Campaign]) -> Vec<&Campaign> {
    let mut sorted: Vec<&Campaign> = campaigns.iter().collect();
    sorted.sort_by_key(|campaign| campaign.apply_order);
    sorted
}

/// Applies the campaigns to `bar_price` in `apply_order` and returns the rounded net with its trace.
pub fn net_from_bar(bar_price: Decimal, campaigns: &[Campaign]) -> NetQuote {
    let (current_price, trace) = walk(bar_price, campaigns);
    NetQuote { net: round_to_unit(current_price), trace }
}

fn walk(bar_price: Decimal, campaigns: &[Campaign]) -> (Decimal, Vec<BreakdownStep>) {
    let mut current_price = bar_price;
    let mut trace = Vec::with_capacity(campaigns.len());

    for campaign in ordered(campaigns) {
        let price_before = current_price;
        let rate = fraction(campaign.discount_value);
        let discount_amount = match campaign.calc_type {
            CalcType::Progressive => current_price.saturating_mul(rate),
            CalcType::Additive => bar_price.saturating_mul(rate),
        };
        current_price = current_price.saturating_sub(discount_amount);

        trace.push(BreakdownStep {
            stage_name: campaign.name.clone(),
            price_before,
            discount_amount,
            price_after: current_price,
            description: format!(
                "{} Discount {}%",
                campaign.calc_type.label(),
                clamp_percent(campaign.discount_value).normalize()
            ),
        });
    }

    (current_price, trace)
}

/// Finds the BAR whose forward net reaches `target_net`, bisecting a fixed number of times
/// between `target_net` and `target_net * 5`.
///
/// The upper bracket saturates at the `Decimal` range when `target_net * 5` does not fit.
pub fn bar_from_net(target_net: Decimal, campaigns: &[Campaign]) -> Decimal {
    let mut low = target_net;
    let mut high = target_net.checked_mul(SEARCH_UPPER_FACTOR).unwrap_or_else(|| {
        let bound = target_net.saturating_mul(SEARCH_UPPER_FACTOR);
        warn!(
            event_name = "pricing.stacking.search_bracket_overflow",
            target_net = %target_net,
            upper_bracket = %bound,
            "upper search bracket exceeds the numeric range; clamped"
        );
        bound
    });
    let mut result = high;

    if net_from_bar(high, campaigns).net < target_net {
        warn!(
            event_name = "pricing.stacking.search_bracket_exhausted",
            target_net = %target_net,
            upper_bracket = %high,
            "campaign stack discounts more than the search bracket covers"
        );
    }

    for _ in 0..SEARCH_ITERATIONS {
        let mid = low / Decimal::TWO + high / Decimal::TWO;
        let NetQuote { net, .. } = net_from_bar(mid, campaigns);

        if net < target_net {
            low = mid;
        } else {
            high = mid;
            result = mid;
        }
    }

    let bar = round_to_unit(result);
    debug!(
        event_name = "pricing.stacking.bar_solved",
        target_net = %target_net,
        bar = %bar,
        campaigns = campaigns.len(),
        "solved BAR from target net"
    );
    bar
}

pub fn pricing_breakdown(bar_price: Decimal, campaigns: &[Campaign]) -> PricingBreakdown {
    DeterministicStackingEngine.breakdown(bar_price, campaigns)
}

/// Checks a campaign list for declared incompatibilities and out-of-range values.
pub fn validate_campaigns(campaigns: &[Campaign]) -> StackValidation {
    let mut validation = StackValidation::default();

    for campaign in campaigns {
        if campaign.discount_value < Decimal::ZERO || campaign.discount_value > ONE_HUNDRED {
            validation.errors.push(format!(
                "Campaign `{}` has discount {}% outside 0-100%.",
                campaign.name, campaign.discount_value
            ));
        }
    }

    for (index, campaign) in campaigns.iter().enumerate() {
        for other in &campaigns[index + 1..] {
            if campaign.conflicts_with(other) {
                validation.errors.push(format!(
                    "Campaign `{}` cannot be combined with `{}`.",
                    campaign.name, other.name
                ));
            }
        }
    }

    let total: Decimal =
        campaigns.iter().map(|campaign| clamp_percent(campaign.discount_value)).sum();
    if total > MAX_TOTAL_DISCOUNT_PCT {
        validation.warnings.push(format!(
            "Combined campaign discount {}% exceeds 80%; the solved BAR may be unreliable.",
            total.normalize()
        ));
    }

    validation.is_valid = validation.errors.is_empty();
    validation
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::{
        bar_from_net, net_from_bar, pricing_breakdown, validate_campaigns,
        DeterministicStackingEngine, StackingEngine,
    };
    use crate::domain::campaign::{CalcType, Campaign};

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn progressive_stack() -> Vec<Campaign> {
        vec![
            Campaign::new("Early Bird (EB-14)", dec(15), CalcType::Progressive, 1),
            Campaign::new("Mobile Rate", dec(10), CalcType::Progressive, 2),
        ]
    }

    #[test]
    fn progressive_campaigns_compound_on_running_price() {
        let quote = net_from_bar(dec(1_000_000), &progressive_stack());

        assert_eq!(quote.net, dec(765_000));
        assert_eq!(quote.trace.len(), 2);
        assert_eq!(quote.trace[0].price_after, dec(850_000));
        assert_eq!(quote.trace[1].price_before, dec(850_000));
        assert_eq!(quote.trace[1].discount_amount, dec(85_000));
        assert_eq!(quote.trace[0].description, "PROGRESSIVE Discount 15%");
    }

    #[test]
    fn additive_campaigns_take_the_original_bar_as_base() {
        let campaigns = vec![
            Campaign::new("Campaign A", dec(10), CalcType::Additive, 1),
            Campaign::new("Campaign B", dec(5), CalcType::Additive, 2),
        ];
        let quote = net_from_bar(dec(1_000_000), &campaigns);

        assert_eq!(quote.net, dec(850_000));
        assert_eq!(quote.trace[0].discount_amount, dec(100_000));
        assert_eq!(quote.trace[1].discount_amount, dec(50_000));
    }

    #[test]
    fn mixed_stack_keeps_additive_against_original_bar() {
        let campaigns = vec![
            Campaign::new("Additive", dec(10), CalcType::Additive, 2),
            Campaign::new("Progressive", dec(20), CalcType::Progressive, 1),
        ];
        let quote = net_from_bar(dec(1_000), &campaigns);

        assert_eq!(quote.trace[0].stage_name, "Progressive");
        assert_eq!(quote.trace[0].price_after, dec(800));
        assert_eq!(quote.trace[1].discount_amount, dec(100));
        assert_eq!(quote.net, dec(700));
    }

    #[test]
    fn apply_order_need_not_be_contiguous() {
        let campaigns = vec![
            Campaign::new("Late", dec(10), CalcType::Progressive, 40),
            Campaign::new("Early", dec(15), CalcType::Progressive, -3),
        ];
        let quote = net_from_bar(dec(1_000_000), &campaigns);

        assert_eq!(quote.trace[0].stage_name, "Early");
        assert_eq!(quote.net, dec(765_000));
    }

    #[test]
    fn out_of_range_discounts_are_clamped() {
        let campaigns = vec![Campaign::new("Broken", dec(150), CalcType::Progressive, 1)];
        let quote = net_from_bar(dec(1_000), &campaigns);

        assert_eq!(quote.net, Decimal::ZERO);
        assert_eq!(quote.trace[0].description, "PROGRESSIVE Discount 100%");
    }

    #[test]
    fn inverse_search_reproduces_target_net() {
        let campaigns = progressive_stack();
        let bar = bar_from_net(dec(1_000_000), &campaigns);
        let net = net_from_bar(bar, &campaigns).net;

        assert!((net - dec(1_000_000)).abs() <= Decimal::ONE, "net {net} from bar {bar}");
        assert!(bar > dec(1_307_000) && bar < dec(1_308_000), "bar {bar}");
    }

    #[test]
    fn empty_stack_inverts_to_the_target() {
        assert_eq!(bar_from_net(dec(500_000), &[]), dec(500_000));
    }

    #[test]
    fn target_beyond_search_range_clamps_bracket_instead_of_overflowing() {
        let target = Decimal::from_i128_with_scale(20_000_000_000_000_000_000_000_000_000, 0);
        let bar = bar_from_net(target, &[]);

        assert!(bar >= target, "bar {bar} below target {target}");

        let negative = bar_from_net(-target, &progressive_stack());
        assert!(negative <= Decimal::ZERO);
    }

    #[test]
    fn forward_walk_saturates_on_huge_additive_stacks() {
        let campaigns = vec![
            Campaign::new("Flash", dec(100), CalcType::Additive, 1),
            Campaign::new("Clearance", dec(100), CalcType::Additive, 2),
            Campaign::new("Closeout", dec(100), CalcType::Additive, 3),
        ];
        let quote = net_from_bar(Decimal::MAX, &campaigns);

        assert_eq!(quote.net, Decimal::MIN);
        assert_eq!(quote.trace.len(), 3);
    }

    #[test]
    fn engine_trait_delegates_to_free_functions() {
        let engine = DeterministicStackingEngine;
        let campaigns = progressive_stack();

        assert_eq!(
            engine.net_from_bar(dec(1_000_000), &campaigns),
            net_from_bar(dec(1_000_000), &campaigns)
        );
        assert_eq!(
            engine.bar_from_net(dec(1_000_000), &campaigns),
            bar_from_net(dec(1_000_000), &campaigns)
        );
        assert_eq!(
            engine.breakdown(dec(1_000_000), &campaigns),
            pricing_breakdown(dec(1_000_000), &campaigns)
        );
    }

    #[test]
    fn breakdown_reports_bar_and_net() {
        let breakdown = pricing_breakdown(dec(1_000_000), &progressive_stack());

        assert_eq!(breakdown.bar_price, dec(1_000_000));
        assert_eq!(breakdown.net_revenue, dec(765_000));
        assert_eq!(breakdown.trace.len(), 2);
    }

    #[test]
    fn campaign_validation_flags_conflicts_ranges_and_heavy_stacks() {
        let campaigns = vec![
            Campaign::new("Early Bird", dec(50), CalcType::Progressive, 1)
                .with_id("eb")
                .incompatible_with("lm"),
            Campaign::new("Last Minute", dec(40), CalcType::Progressive, 2).with_id("lm"),
            Campaign::new("Negative", dec(-1), CalcType::Additive, 3),
        ];

        let validation = validate_campaigns(&campaigns);
        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 2);
        assert!(validation.errors.iter().any(|e| e.contains("cannot be combined")));
        assert!(validation.errors.iter().any(|e| e.contains("outside 0-100%")));
        assert_eq!(validation.warnings.len(), 1);

        let clean = validate_campaigns(&progressive_stack());
        assert!(clean.is_valid);
        assert!(clean.warnings.is_empty());
    }

    proptest! {
        #[test]
        fn solved_bar_grows_with_target_net(
            base in 1_000i64..5_000_000,
            step in 1_000i64..1_000_000,
            first in 0i64..40,
            second in 0i64..40,
            additive in any::<bool>(),
        ) {
            let second_type = if additive { CalcType::Additive } else { CalcType::Progressive };
            let campaigns = vec![
                Campaign::new("first", dec(first), CalcType::Progressive, 1),
                Campaign::new("second", dec(second), second_type, 2),
            ];

            let lower = bar_from_net(dec(base), &campaigns);
            let higher = bar_from_net(dec(base + step), &campaigns);
            prop_assert!(higher > lower, "{higher} should exceed {lower}");
        }

        #[test]
        fn forward_net_never_decreases_with_bar(
            bar in 0i64..10_000_000,
            raise in 0i64..1_000_000,
            first in 0i64..50,
            second in 0i64..30,
        ) {
            let campaigns = vec![
                Campaign::new("first", dec(first), CalcType::Additive, 1),
                Campaign::new("second", dec(second), CalcType::Progressive, 2),
            ];

            let low = net_from_bar(dec(bar), &campaigns).net;
            let high = net_from_bar(dec(bar + raise), &campaigns).net;
            prop_assert!(high >= low);
        }
    }
}
