//! Channel pricing with a commission layer and closed-form inversion.
//!
//! Every promotion in a given mode acts on the same reference price, so net -> BAR divides by the
//! commission multiplier and then by either the product of `(1 - d_i)` or `(1 - sum d_i)`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::promotion::{CalculationMode, PromotionGroup, PromotionInstance};
use crate::pricing::validator::{DeterministicStackValidator, StackValidation, StackValidator};
use crate::pricing::{
    clamp_percent, discount_vs_base, fraction, round_to_unit, MAX_TOTAL_DISCOUNT_PCT, ONE_HUNDRED,
};

const COMMISSION_TOO_LARGE: &str = "Commission is too large (>= 100%) to invert into a BAR price.";
const STACK_CANCELS_PRICE: &str = "Combined promotions cancel the selling price (>= 100%).";
const STACK_TOO_HIGH: &str = "Combined promotions are very high (>= 80% of BAR). Review the stack.";
const PRICE_OUT_OF_RANGE: &str = "Price is outside the supported numeric range.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_name: String,
    pub percent: Decimal,
    pub price_after_step: Decimal,
    pub cumulative_discount_vs_base: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub final_price: Decimal,
    pub trace: Vec<TraceStep>,
    pub total_discount_multiplier: Decimal,
    pub total_discount_sum: Decimal,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CalculationResult {
    fn failed(
        errors: Vec<String>,
        warnings: Vec<String>,
        total_discount_multiplier: Decimal,
        total_discount_sum: Decimal,
    ) -> Self {
        Self {
            final_price: Decimal::ZERO,
            trace: Vec::new(),
            total_discount_multiplier,
            total_discount_sum,
            is_valid: false,
            errors,
            warnings,
        }
    }
}

pub trait ChannelEngine: Send + Sync {
    fn net_from_bar(
        &self,
        bar: Decimal,
        commission_pct: Decimal,
        promotions: &[PromotionInstance],
        mode: CalculationMode,
    ) -> CalculationResult;

    fn bar_from_net(
        &self,
        target_net: Decimal,
        commission_pct: Decimal,
        promotions: &[PromotionInstance],
        mode: CalculationMode,
    ) -> CalculationResult;
}

pub struct DeterministicChannelEngine<V = DeterministicStackValidator> {
    validator: V,
}

impl<V> DeterministicChannelEngine<V> {
    pub fn new(validator: V) -> Self {
        Self { validator }
    }
}

impl Default for DeterministicChannelEngine<DeterministicStackValidator> {
    fn default() -> Self {
        Self::new(DeterministicStackValidator)
    }
}

/// Enabled promotions that take part in a calculation, sorted by `apply_order`.
///
/// An enabled customized essential that opts out of stacking removes every other essential
/// promotion from the set. The configuration itself is left untouched.
pub fn resolve_active_set(promotions: &[PromotionInstance]) -> Vec<&PromotionInstance> {
    let customized_blocks = promotions.iter().any(PromotionInstance::excludes_other_essentials);

    let mut active: Vec<&PromotionInstance> = promotions
        .iter()
        .filter(|promotion| promotion.is_enabled)
        .filter(|promotion| {
            !(customized_blocks
                && promotion.group() == PromotionGroup::Essential
                && !promotion.is_customized_essential())
        })
        .collect();
    active.sort_by_key(|promotion| promotion.apply_order);
    active
}

impl<V> ChannelEngine for DeterministicChannelEngine<V>
where
    V: StackValidator,
{
    fn net_from_bar(
        &self,
        bar: Decimal,
        commission_pct: Decimal,
        promotions: &[PromotionInstance],
        mode: CalculationMode,
    ) -> CalculationResult {
        let StackValidation { mut errors, warnings, .. } = self.validator.validate(promotions);
        let active = resolve_active_set(promotions);

        let mut trace = Vec::with_capacity(active.len());
        let mut current_price = bar;
        let mut multiplier = Decimal::ONE;
        let mut sum_discount = Decimal::ZERO;

        match mode {
            CalculationMode::Progressive => {
                for promotion in &active {
                    let rate = fraction(promotion.percent);
                    current_price -= current_price * rate;
                    multiplier *= Decimal::ONE - rate;
                    trace.push(TraceStep {
                        step_name: promotion.name().to_string(),
                        percent: clamp_percent(promotion.percent),
                        price_after_step: current_price,
                        cumulative_discount_vs_base: discount_vs_base(bar, current_price),
                    });
                }
            }
            CalculationMode::Additive => {
                let mut cumulative_percent = Decimal::ZERO;
                let mut overflowed = false;
                for promotion in &active {
                    let percent = clamp_percent(promotion.percent);
                    cumulative_percent += percent;
                    sum_discount += percent / ONE_HUNDRED;
                    let remaining = Decimal::ONE - cumulative_percent / ONE_HUNDRED;
                    current_price = bar.checked_mul(remaining).unwrap_or_else(|| {
                        overflowed = true;
                        bar.saturating_mul(remaining)
                    });
                    trace.push(TraceStep {
                        step_name: promotion.name().to_string(),
                        percent,
                        price_after_step: current_price,
                        cumulative_discount_vs_base: cumulative_percent,
                    });
                }
                if sum_discount >= Decimal::ONE {
                    errors.push(STACK_CANCELS_PRICE.to_string());
                }
                if overflowed {
                    errors.push(PRICE_OUT_OF_RANGE.to_string());
                }
            }
        }

        let net_final =
            (current_price * (Decimal::ONE - fraction(commission_pct))).max(Decimal::ZERO);
        let is_valid = errors.is_empty();

        debug!(
            event_name = "pricing.channel.net_computed",
            bar = %bar,
            net = %net_final,
            active_promotions = active.len(),
            is_valid,
            "computed channel net from BAR"
        );

        CalculationResult {
            final_price: round_to_unit(net_final),
            trace,
            total_discount_multiplier: multiplier,
            total_discount_sum: (sum_discount * ONE_HUNDRED).min(ONE_HUNDRED),
            is_valid,
            errors,
            warnings,
        }
    }

    fn bar_from_net(
        &self,
        target_net: Decimal,
        commission_pct: Decimal,
        promotions: &[PromotionInstance],
        mode: CalculationMode,
    ) -> CalculationResult {
        let StackValidation { mut errors, mut warnings, .. } = self.validator.validate(promotions);
        let active = resolve_active_set(promotions);

        let commission_multiplier = Decimal::ONE - fraction(commission_pct);
        if commission_multiplier <= Decimal::ZERO {
            warn!(
                event_name = "pricing.channel.inverse_failed",
                reason = "commission",
                commission_pct = %commission_pct,
                "commission leaves nothing to invert"
            );
            errors.push(COMMISSION_TOO_LARGE.to_string());
            return CalculationResult::failed(errors, warnings, Decimal::ONE, Decimal::ZERO);
        }

        let Some(gross_needed) = target_net.checked_div(commission_multiplier) else {
            return out_of_range(errors, warnings, target_net, Decimal::ONE, Decimal::ZERO);
        };
        let mut trace = Vec::with_capacity(active.len());
        let mut multiplier = Decimal::ONE;
        let mut sum_discount = Decimal::ZERO;

        let final_price = match mode {
            CalculationMode::Progressive => {
                for promotion in &active {
                    multiplier *= Decimal::ONE - fraction(promotion.percent);
                }
                if multiplier <= Decimal::ZERO {
                    warn!(
                        event_name = "pricing.channel.inverse_failed",
                        reason = "progressive_multiplier",
                        "promotion stack cancels the price"
                    );
                    errors.push(STACK_CANCELS_PRICE.to_string());
                    return CalculationResult::failed(errors, warnings, multiplier, Decimal::ZERO);
                }

                let Some(final_price) = gross_needed.checked_div(multiplier) else {
                    return out_of_range(errors, warnings, target_net, multiplier, Decimal::ZERO);
                };

                // Replayed forward for display only.
                let mut trace_price = final_price;
                for promotion in &active {
                    trace_price -= trace_price * fraction(promotion.percent);
                    trace.push(TraceStep {
                        step_name: promotion.name().to_string(),
                        percent: clamp_percent(promotion.percent),
                        price_after_step: trace_price,
                        cumulative_discount_vs_base: discount_vs_base(final_price, trace_price),
                    });
                }
                final_price
            }
            CalculationMode::Additive => {
                sum_discount = active.iter().map(|promotion| fraction(promotion.percent)).sum();
                if sum_discount * ONE_HUNDRED >= MAX_TOTAL_DISCOUNT_PCT {
                    warnings.push(STACK_TOO_HIGH.to_string());
                }

                let divisor = Decimal::ONE - sum_discount;
                if divisor <= Decimal::ZERO {
                    warn!(
                        event_name = "pricing.channel.inverse_failed",
                        reason = "additive_divisor",
                        sum_discount = %sum_discount,
                        "promotion stack cancels the price"
                    );
                    errors.push(STACK_CANCELS_PRICE.to_string());
                    return CalculationResult::failed(
                        errors,
                        warnings,
                        Decimal::ONE,
                        sum_discount * ONE_HUNDRED,
                    );
                }

                let Some(final_price) = gross_needed.checked_div(divisor) else {
                    return out_of_range(
                        errors,
                        warnings,
                        target_net,
                        Decimal::ONE,
                        sum_discount * ONE_HUNDRED,
                    );
                };

                let mut cumulative_percent = Decimal::ZERO;
                for promotion in &active {
                    let percent = clamp_percent(promotion.percent);
                    cumulative_percent += percent;
                    trace.push(TraceStep {
                        step_name: promotion.name().to_string(),
                        percent,
                        price_after_step: final_price
                            .saturating_mul(Decimal::ONE - cumulative_percent / ONE_HUNDRED),
                        cumulative_discount_vs_base: cumulative_percent,
                    });
                }
                final_price
            }
        };

        let is_valid = errors.is_empty();
        debug!(
            event_name = "pricing.channel.bar_computed",
            target_net = %target_net,
            gross_needed = %gross_needed,
            bar = %final_price,
            active_promotions = active.len(),
            is_valid,
            "computed channel BAR from target net"
        );

        CalculationResult {
            final_price: round_to_unit(final_price),
            trace,
            total_discount_multiplier: multiplier,
            total_discount_sum: sum_discount * ONE_HUNDRED,
            is_valid,
            errors,
            warnings,
        }
    }
}

fn out_of_range(
    mut errors: Vec<String>,
    warnings: Vec<String>,
    target_net: Decimal,
    total_discount_multiplier: Decimal,
    total_discount_sum: Decimal,
) -> CalculationResult {
    warn!(
        event_name = "pricing.channel.inverse_failed",
        reason = "numeric_range",
        target_net = %target_net,
        "solved BAR does not fit the numeric range"
    );
    errors.push(PRICE_OUT_OF_RANGE.to_string());
    CalculationResult::failed(errors, warnings, total_discount_multiplier, total_discount_sum)
}

/// Net revenue retained from `bar` after promotions and commission.
pub fn channel_net_from_bar(
    bar: Decimal,
    commission_pct: Decimal,
    promotions: &[PromotionInstance],
    mode: CalculationMode,
) -> CalculationResult {
    DeterministicChannelEngine::default().net_from_bar(bar, commission_pct, promotions, mode)
}

/// BAR that nets `target_net` after promotions and commission.
pub fn channel_bar_from_net(
    target_net: Decimal,
    commission_pct: Decimal,
    promotions: &[PromotionInstance],
    mode: CalculationMode,
) -> CalculationResult {
    DeterministicChannelEngine::default().bar_from_net(target_net, commission_pct, promotions, mode)
}
