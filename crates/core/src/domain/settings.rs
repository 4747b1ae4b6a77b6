use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::promotion::{
    CalculationMode, InstanceId, PromotionGroup, PromotionInstance, PromotionTemplate,
};
use crate::errors::DomainError;
use crate::pricing::catalog::find_template;
use crate::pricing::channel::{channel_bar_from_net, channel_net_from_bar, CalculationResult};
use crate::pricing::validator::{validate_stack, StackValidation};
use crate::pricing::ONE_HUNDRED;

/// Commission, mode and promotion list for one channel configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPricingSettings {
    pub commission: Decimal,
    pub calc_mode: CalculationMode,
    #[serde(default)]
    pub promotions: Vec<PromotionInstance>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: PromotionGroup,
    pub total: usize,
    pub enabled: usize,
}

impl Default for ChannelPricingSettings {
    fn default() -> Self {
        Self::new(Decimal::new(20, 0), CalculationMode::Additive)
    }
}

fn checked_percent(percent: Decimal) -> Result<Decimal, DomainError> {
    if percent < Decimal::ZERO || percent > ONE_HUNDRED {
        return Err(DomainError::PercentOutOfRange(percent));
    }
    Ok(percent)
}

impl ChannelPricingSettings {
    pub fn new(commission: Decimal, calc_mode: CalculationMode) -> Self {
        Self { commission, calc_mode, promotions: Vec::new() }
    }

    /// Attaches `template` as a new enabled instance at the end of the apply order.
    ///
    /// `percent` falls back to the template default; a template without one needs an explicit value.
    pub fn add_promotion(
        &mut self,
        template: PromotionTemplate,
        percent: Option<Decimal>,
    ) -> Result<InstanceId, DomainError> {
        let percent = percent
            .or(template.default_percent)
            .ok_or_else(|| DomainError::PercentRequired { template_id: template.id.clone() })?;
        let percent = checked_percent(percent)?;
        let apply_order = i32::try_from(self.promotions.len()).map_err(|_| {
            DomainError::InvariantViolation("promotion list exceeds apply order range".to_string())
        })?;

        let instance_id = InstanceId(format!("promo-{}", Uuid::new_v4()));
        self.promotions.push(PromotionInstance {
            instance_id: instance_id.clone(),
            template,
            percent,
            is_enabled: true,
            apply_order,
            allow_stack_with_other_essential: None,
        });
        Ok(instance_id)
    }

    pub fn add_from_catalog(
        &mut self,
        template_id: &str,
        percent: Option<Decimal>,
    ) -> Result<InstanceId, DomainError> {
        let entry = find_template(template_id)
            .ok_or_else(|| DomainError::UnknownTemplate(template_id.to_string()))?;
        self.add_promotion(entry.to_template(), percent)
    }

    pub fn set_enabled(&mut self, instance_id: &InstanceId, enabled: bool) -> Result<(), DomainError> {
        self.instance_mut(instance_id)?.is_enabled = enabled;
        Ok(())
    }

    pub fn set_percent(
        &mut self,
        instance_id: &InstanceId,
        percent: Decimal,
    ) -> Result<(), DomainError> {
        let percent = checked_percent(percent)?;
        self.instance_mut(instance_id)?.percent = percent;
        Ok(())
    }

    pub fn set_apply_order(
        &mut self,
        instance_id: &InstanceId,
        apply_order: i32,
    ) -> Result<(), DomainError> {
        self.instance_mut(instance_id)?.apply_order = apply_order;
        Ok(())
    }

    pub fn set_allow_stack_with_other_essential(
        &mut self,
        instance_id: &InstanceId,
        allow: bool,
    ) -> Result<(), DomainError> {
        self.instance_mut(instance_id)?.allow_stack_with_other_essential = Some(allow);
        Ok(())
    }

    pub fn remove_promotion(
        &mut self,
        instance_id: &InstanceId,
    ) -> Result<PromotionInstance, DomainError> {
        let index = self
            .promotions
            .iter()
            .position(|promotion| &promotion.instance_id == instance_id)
            .ok_or_else(|| DomainError::UnknownPromotionInstance(instance_id.clone()))?;
        Ok(self.promotions.remove(index))
    }

    pub fn group_summaries(&self) -> Vec<GroupSummary> {
        [PromotionGroup::Seasonal, PromotionGroup::Essential, PromotionGroup::Targeted]
            .into_iter()
            .map(|group| {
                let in_group = self.promotions.iter().filter(|promotion| promotion.group() == group);
                let (total, enabled) = in_group.fold((0, 0), |(total, enabled), promotion| {
                    (total + 1, enabled + usize::from(promotion.is_enabled))
                });
                GroupSummary { group, total, enabled }
            })
            .collect()
    }

    pub fn validate(&self) -> StackValidation {
        validate_stack(&self.promotions)
    }

    pub fn net_to_bar(&self, target_net: Decimal) -> CalculationResult {
        channel_bar_from_net(target_net, self.commission, &self.promotions, self.calc_mode)
    }

    pub fn bar_to_net(&self, bar: Decimal) -> CalculationResult {
        channel_net_from_bar(bar, self.commission, &self.promotions, self.calc_mode)
    }

    fn instance_mut(
        &mut self,
        instance_id: &InstanceId,
    ) -> Result<&mut PromotionInstance, DomainError> {
        self.promotions
            .iter_mut()
            .find(|promotion| &promotion.instance_id == instance_id)
            .ok_or_else(|| DomainError::UnknownPromotionInstance(instance_id.clone()))
    }
}
