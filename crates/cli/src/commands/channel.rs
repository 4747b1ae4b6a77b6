use std::path::Path;

use ratedesk_core::config::PricingConfig;
use ratedesk_core::{
    ApplicationError, CalculationMode, CalculationResult, ChannelPricingSettings, DomainError,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::commands::{load_config, read_json, CommandResult};

/// Channel configuration as stored by the caller; missing commission or mode fall back to config.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsFile {
    pub commission: Option<Decimal>,
    pub calc_mode: Option<CalculationMode>,
    #[serde(default)]
    pub promotions: Vec<PromotionEntry>,
}

/// A catalog promotion attached to the configuration.
#[derive(Debug, Deserialize)]
pub struct PromotionEntry {
    pub template_id: String,
    pub percent: Option<Decimal>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub apply_order: Option<i32>,
    pub allow_stack_with_other_essential: Option<bool>,
}

fn enabled_by_default() -> bool {
    true
}

impl SettingsFile {
    pub fn into_settings(
        self,
        defaults: &PricingConfig,
    ) -> Result<ChannelPricingSettings, DomainError> {
        let mut settings = defaults.default_settings();
        if let Some(commission) = self.commission {
            settings.commission = commission;
        }
        if let Some(calc_mode) = self.calc_mode {
            settings.calc_mode = calc_mode;
        }

        for entry in self.promotions {
            let instance_id = settings.add_from_catalog(&entry.template_id, entry.percent)?;
            settings.set_enabled(&instance_id, entry.enabled)?;
            if let Some(apply_order) = entry.apply_order {
                settings.set_apply_order(&instance_id, apply_order)?;
            }
            if let Some(allow) = entry.allow_stack_with_other_essential {
                settings.set_allow_stack_with_other_essential(&instance_id, allow)?;
            }
        }

        Ok(settings)
    }
}

pub(crate) fn load_settings(path: &Path) -> Result<ChannelPricingSettings, ApplicationError> {
    let config = load_config()?;
    let file: SettingsFile = read_json(path)?;
    Ok(file.into_settings(&config.pricing)?)
}

pub fn run_net(bar: Decimal, settings_path: &Path) -> CommandResult {
    match load_settings(settings_path) {
        Ok(settings) => report("channel-net", settings.bar_to_net(bar), |price| {
            format!("net {price} from BAR {bar}")
        }),
        Err(error) => CommandResult::from_error("channel-net", &error),
    }
}

pub fn run_bar(target_net: Decimal, settings_path: &Path) -> CommandResult {
    match load_settings(settings_path) {
        Ok(settings) => report("channel-bar", settings.net_to_bar(target_net), |price| {
            format!("BAR {price} nets {target_net}")
        }),
        Err(error) => CommandResult::from_error("channel-bar", &error),
    }
}

fn report(
    command: &str,
    result: CalculationResult,
    describe: impl FnOnce(Decimal) -> String,
) -> CommandResult {
    tracing::debug!(
        event_name = "cli.channel.calculated",
        command,
        final_price = %result.final_price,
        is_valid = result.is_valid,
        "channel calculation completed"
    );

    if !result.is_valid {
        let message = result.errors.join(" ");
        return CommandResult::invalid(command, message, result);
    }
    let message = describe(result.final_price);
    CommandResult::success_with(command, message, result)
}
