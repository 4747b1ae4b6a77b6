use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use ratedesk_cli::commands::{catalog, channel, config, stacking, validate};
use ratedesk_core::PromotionGroup;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

const PROGRESSIVE_CAMPAIGNS: &str = r#"[
    { "name": "Early Bird", "discount_value": 15, "calc_type": "progressive", "apply_order": 1 },
    { "name": "Member", "discount_value": 10, "calc_type": "progressive", "apply_order": 2 }
]"#;

const ADDITIVE_CHANNEL: &str = r#"{
    "commission": 15,
    "calc_mode": "additive",
    "promotions": [
        { "template_id": "agoda-seasonal-payday", "percent": 10 },
        { "template_id": "agoda-targeted-mobile", "percent": 5 }
    ]
}"#;

#[test]
fn net_from_bar_reports_rounded_net_and_trace() {
    let dir = TempDir::new().expect("temp dir");
    let campaigns = write_file(&dir, "campaigns.json", PROGRESSIVE_CAMPAIGNS);

    let result = stacking::run_net_from_bar(Decimal::new(1_307_190, 0), &campaigns);
    assert_eq!(result.exit_code, 0, "expected successful net-from-bar");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "net-from-bar");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["bar_price"], "1307190");
    assert_eq!(payload["data"]["net_revenue"], "1000000");
    assert_eq!(payload["data"]["trace"].as_array().map(Vec::len), Some(2));
}

#[test]
fn bar_from_net_solves_progressive_stack() {
    let dir = TempDir::new().expect("temp dir");
    let campaigns = write_file(&dir, "campaigns.json", PROGRESSIVE_CAMPAIGNS);

    let result = stacking::run_bar_from_net(Decimal::new(1_000_000, 0), &campaigns);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["bar"], "1307190");
    assert_eq!(payload["data"]["net_at_bar"], "1000000");
}

#[test]
fn unreadable_campaign_file_is_an_input_error() {
    let dir = TempDir::new().expect("temp dir");
    let campaigns = write_file(&dir, "campaigns.json", "{ not json");

    let result = stacking::run_net_from_bar(Decimal::new(100, 0), &campaigns);
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "input");
}

#[test]
fn channel_bar_inverts_additive_stack_with_commission() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let settings = write_file(&dir, "channel.json", ADDITIVE_CHANNEL);

        let result = channel::run_bar(Decimal::new(1_000_000, 0), &settings);
        assert_eq!(result.exit_code, 0, "expected successful channel-bar: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "channel-bar");
        assert_eq!(payload["data"]["final_price"], "1384083");
        assert_eq!(payload["data"]["is_valid"], true);
    });
}

#[test]
fn channel_net_uses_configured_commission_when_settings_omit_it() {
    with_env(&[("RATEDESK_PRICING_DEFAULT_COMMISSION_PCT", "10")], || {
        let dir = TempDir::new().expect("temp dir");
        let settings = write_file(&dir, "channel.json", r#"{ "promotions": [] }"#);

        let result = channel::run_net(Decimal::new(1_000, 0), &settings);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["final_price"], "900");
    });
}

#[test]
fn channel_net_rejects_invalid_configuration_from_env() {
    with_env(&[("RATEDESK_LOGGING_LEVEL", "chatty")], || {
        let dir = TempDir::new().expect("temp dir");
        let settings = write_file(&dir, "channel.json", ADDITIVE_CHANNEL);

        let result = channel::run_net(Decimal::new(1_000, 0), &settings);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn duplicate_seasonal_promotions_report_invalid_calculation() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let settings = write_file(
            &dir,
            "channel.json",
            r#"{ "commission": 20, "promotions": [
                { "template_id": "agoda-seasonal-payday", "percent": 10 },
                { "template_id": "agoda-seasonal-summer", "percent": 8 }
            ] }"#,
        );

        let result = channel::run_bar(Decimal::new(500_000, 0), &settings);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "invalid");
        assert_eq!(payload["error_class"], "invalid_calculation");
        assert_eq!(payload["data"]["is_valid"], false);

        let validation = validate::run_settings(&settings);
        assert_eq!(validation.exit_code, 4);
        let payload = parse_payload(&validation.output);
        assert_eq!(payload["data"]["validation"]["is_valid"], false);
    });
}

#[test]
fn unknown_template_is_reported_as_domain_error() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let settings = write_file(
            &dir,
            "channel.json",
            r#"{ "promotions": [ { "template_id": "agoda-unknown", "percent": 5 } ] }"#,
        );

        let result = validate::run_settings(&settings);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "domain_validation");
    });
}

#[test]
fn validate_campaigns_flags_incompatible_pair_and_warns_on_deep_stack() {
    let dir = TempDir::new().expect("temp dir");
    let campaigns = write_file(
        &dir,
        "campaigns.json",
        r#"[
            { "id": "flash", "name": "Flash", "discount_value": 60, "calc_type": "additive",
              "apply_order": 1, "incompatible_with": ["clearance"] },
            { "id": "clearance", "name": "Clearance", "discount_value": 30,
              "calc_type": "additive", "apply_order": 2 }
        ]"#,
    );

    let result = validate::run_campaigns(&campaigns);
    assert_eq!(result.exit_code, 4);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["is_valid"], false);
    assert_eq!(payload["data"]["warnings"].as_array().map(Vec::len), Some(1));
}

#[test]
fn catalog_search_spans_groups_when_no_group_given() {
    let all = parse_payload(&catalog::run(None, Some("sale")).output);
    let seasonal = parse_payload(&catalog::run(Some(PromotionGroup::Seasonal), Some("sale")).output);

    let all_count = all["data"].as_array().map(Vec::len).unwrap_or_default();
    let seasonal_count = seasonal["data"].as_array().map(Vec::len).unwrap_or_default();
    assert!(seasonal_count > 0);
    assert!(all_count >= seasonal_count);
}

#[test]
fn config_reports_env_source_for_overridden_fields() {
    with_env(&[("RATEDESK_PRICING_DEFAULT_CALC_MODE", "progressive")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "ok");

        let lines = payload["data"].as_array().expect("config lines");
        let calc_mode = lines
            .iter()
            .find(|line| line["key"] == "pricing.default_calc_mode")
            .expect("calc mode line");
        assert_eq!(calc_mode["value"], "progressive");
        assert_eq!(calc_mode["source"], "env (RATEDESK_PRICING_DEFAULT_CALC_MODE)");

        let level =
            lines.iter().find(|line| line["key"] == "logging.level").expect("log level line");
        assert_eq!(level["value"], "info");
        assert_eq!(level["source"], "default");

        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("- logging.level = info (source: default)"));
    });
}

#[test]
fn config_reports_invalid_configuration_as_json_failure() {
    with_env(&[("RATEDESK_LOG_FORMAT", "xml")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["data"].is_null());
    });
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be written");
    path
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "RATEDESK_PRICING_DEFAULT_COMMISSION_PCT",
        "RATEDESK_PRICING_DEFAULT_CALC_MODE",
        "RATEDESK_LOGGING_LEVEL",
        "RATEDESK_LOGGING_FORMAT",
        "RATEDESK_LOG_LEVEL",
        "RATEDESK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
