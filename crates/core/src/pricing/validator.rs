use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::promotion::{PromotionGroup, PromotionInstance, TargetSubCategory};
use crate::pricing::{MAX_TOTAL_DISCOUNT_PCT, ONE_HUNDRED};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for StackValidation {
    fn default() -> Self {
        Self { is_valid: true, errors: Vec::new(), warnings: Vec::new() }
    }
}

pub trait StackValidator: Send + Sync {
    fn validate(&self, promotions: &[PromotionInstance]) -> StackValidation;
}

#[derive(Default)]
pub struct DeterministicStackValidator;

impl StackValidator for DeterministicStackValidator {
    fn validate(&self, promotions: &[PromotionInstance]) -> StackValidation {
        validate_stack(promotions)
    }
}

/// Checks cardinality and exclusivity rules over the enabled promotions of a configuration.
pub fn validate_stack(promotions: &[PromotionInstance]) -> StackValidation {
    let enabled: Vec<&PromotionInstance> =
        promotions.iter().filter(|promotion| promotion.is_enabled).collect();
    let mut result = StackValidation::default();

    for promotion in &enabled {
        if promotion.percent < Decimal::ZERO || promotion.percent > ONE_HUNDRED {
            result.errors.push(format!(
                "Promotion `{}` has percent {}% outside 0-100%.",
                promotion.name(),
                promotion.percent
            ));
        }
    }

    let seasonal =
        enabled.iter().filter(|promotion| promotion.group() == PromotionGroup::Seasonal).count();
    if seasonal > 1 {
        result.errors.push(
            "Seasonal promotions cannot stack with each other. Enable only one seasonal campaign."
                .to_string(),
        );
    }

    let mut per_sub_category: BTreeMap<TargetSubCategory, usize> = BTreeMap::new();
    for promotion in &enabled {
        if promotion.group() != PromotionGroup::Targeted {
            continue;
        }
        if let Some(sub_category) = promotion.sub_category() {
            *per_sub_category.entry(sub_category).or_default() += 1;
        }
    }
    for (sub_category, count) in per_sub_category {
        if count > 1 {
            result.errors.push(format!(
                "Targeted promotions in sub-category {sub_category} cannot stack. Enable only one."
            ));
        }
    }

    let customized_blocks =
        enabled.iter().any(|promotion| promotion.excludes_other_essentials());
    let other_essentials = enabled.iter().any(|promotion| {
        promotion.group() == PromotionGroup::Essential && !promotion.is_customized_essential()
    });
    if customized_blocks && other_essentials {
        result.warnings.push(
            "Customized Promotion is configured not to stack with other Essential promotions. \
             The other Essential promotions will be ignored."
                .to_string(),
        );
    }

    let total: Decimal = enabled.iter().map(|promotion| promotion.percent).sum();
    if total > MAX_TOTAL_DISCOUNT_PCT {
        result.errors.push("Total discount must not exceed 80%.".to_string());
    }

    result.is_valid = result.errors.is_empty();
    result
}
