use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ratedesk_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

const COMMAND: &str = "config";

struct Field<'a> {
    key_path: &'a str,
    value: String,
    env_keys: &'a [&'a str],
}

/// One effective setting and where its value came from.
#[derive(Debug, Serialize)]
pub struct ConfigLine {
    pub key: String,
    pub value: String,
    pub source: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        Field {
            key_path: "pricing.default_commission_pct",
            value: config.pricing.default_commission_pct.to_string(),
            env_keys: &["RATEDESK_PRICING_DEFAULT_COMMISSION_PCT"],
        },
        Field {
            key_path: "pricing.default_calc_mode",
            value: config.pricing.default_calc_mode.as_str().to_string(),
            env_keys: &["RATEDESK_PRICING_DEFAULT_CALC_MODE"],
        },
        Field {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["RATEDESK_LOGGING_LEVEL", "RATEDESK_LOG_LEVEL"],
        },
        Field {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["RATEDESK_LOGGING_FORMAT", "RATEDESK_LOG_FORMAT"],
        },
    ];

    let lines: Vec<ConfigLine> = fields
        .into_iter()
        .map(|field| ConfigLine {
            source: field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
            key: field.key_path.to_string(),
            value: field.value,
        })
        .collect();

    let message = lines
        .iter()
        .map(|line| render_line(&line.key, &line.value, &line.source))
        .collect::<Vec<_>>()
        .join("\n");
    CommandResult::success_with(
        COMMAND,
        format!("effective config (source precedence: env > file > default):\n{message}"),
        lines,
    )
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("ratedesk.toml"), PathBuf::from("config/ratedesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}
