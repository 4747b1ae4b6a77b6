use std::path::Path;

use ratedesk_core::{validate_campaigns, Campaign, GroupSummary, StackValidation};
use serde::Serialize;

use crate::commands::channel::load_settings;
use crate::commands::{read_json, CommandResult};

const COMMAND: &str = "validate";

#[derive(Debug, Serialize)]
struct SettingsReport {
    validation: StackValidation,
    groups: Vec<GroupSummary>,
}

pub fn run_settings(settings_path: &Path) -> CommandResult {
    let settings = match load_settings(settings_path) {
        Ok(settings) => settings,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let report =
        SettingsReport { validation: settings.validate(), groups: settings.group_summaries() };
    finish(report.validation.clone(), report)
}

pub fn run_campaigns(campaigns_path: &Path) -> CommandResult {
    let campaigns: Vec<Campaign> = match read_json(campaigns_path) {
        Ok(campaigns) => campaigns,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let validation = validate_campaigns(&campaigns);
    finish(validation.clone(), validation)
}

fn finish(validation: StackValidation, data: impl Serialize) -> CommandResult {
    if !validation.is_valid {
        return CommandResult::invalid(COMMAND, validation.errors.join(" "), data);
    }

    let message = match validation.warnings.len() {
        0 => "stack is valid".to_string(),
        count => format!("stack is valid with {count} warning(s)"),
    };
    CommandResult::success_with(COMMAND, message, data)
}
