use std::path::Path;

use ratedesk_core::{validate_campaigns, Campaign, DeterministicStackingEngine, StackingEngine};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{read_json, CommandResult};

#[derive(Debug, Serialize)]
struct SolvedBar {
    target_net: Decimal,
    bar: Decimal,
    net_at_bar: Decimal,
    warnings: Vec<String>,
}

pub fn run_net_from_bar(bar: Decimal, campaigns_path: &Path) -> CommandResult {
    net_from_bar_with(&DeterministicStackingEngine, bar, campaigns_path)
}

pub fn run_bar_from_net(target_net: Decimal, campaigns_path: &Path) -> CommandResult {
    bar_from_net_with(&DeterministicStackingEngine, target_net, campaigns_path)
}

pub fn net_from_bar_with(
    engine: &dyn StackingEngine,
    bar: Decimal,
    campaigns_path: &Path,
) -> CommandResult {
    let campaigns: Vec<Campaign> = match read_json(campaigns_path) {
        Ok(campaigns) => campaigns,
        Err(error) => return CommandResult::from_error("net-from-bar", &error),
    };

    let validation = validate_campaigns(&campaigns);
    let breakdown = engine.breakdown(bar, &campaigns);
    tracing::debug!(
        event_name = "cli.stacking.calculated",
        command = "net-from-bar",
        bar = %bar,
        net = %breakdown.net_revenue,
        "net computed from BAR"
    );

    if !validation.is_valid {
        return CommandResult::invalid("net-from-bar", validation.errors.join(" "), breakdown);
    }
    let message = format!("net {} from BAR {bar}", breakdown.net_revenue);
    CommandResult::success_with("net-from-bar", message, breakdown)
}

pub fn bar_from_net_with(
    engine: &dyn StackingEngine,
    target_net: Decimal,
    campaigns_path: &Path,
) -> CommandResult {
    let campaigns: Vec<Campaign> = match read_json(campaigns_path) {
        Ok(campaigns) => campaigns,
        Err(error) => return CommandResult::from_error("bar-from-net", &error),
    };

    let validation = validate_campaigns(&campaigns);
    let bar = engine.bar_from_net(target_net, &campaigns);
    let solved = SolvedBar {
        target_net,
        bar,
        net_at_bar: engine.net_from_bar(bar, &campaigns).net,
        warnings: validation.warnings,
    };
    tracing::debug!(
        event_name = "cli.stacking.calculated",
        command = "bar-from-net",
        target_net = %target_net,
        bar = %bar,
        "BAR solved from target net"
    );

    if !validation.is_valid {
        return CommandResult::invalid("bar-from-net", validation.errors.join(" "), solved);
    }
    CommandResult::success_with("bar-from-net", format!("BAR {bar} nets {target_net}"), solved)
}
