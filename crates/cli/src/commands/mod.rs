pub mod catalog;
pub mod channel;
pub mod config;
pub mod stacking;
pub mod validate;

use std::fs;
use std::path::Path;

use ratedesk_core::config::{AppConfig, LoadOptions};
use ratedesk_core::ApplicationError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;
pub const EXIT_INVALID: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    data: Option<T>,
}

impl CommandResult {
    pub fn success_with(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        Self::with_data(command, "ok", None, message.into(), Some(data), 0)
    }

    /// A calculation that completed but was flagged invalid; the data is still reported.
    pub fn invalid(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        Self::with_data(
            command,
            "invalid",
            Some("invalid_calculation"),
            message.into(),
            Some(data),
            EXIT_INVALID,
        )
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::with_data::<()>(command, "error", Some(error_class), message.into(), None, exit_code)
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        let exit_code = match error {
            ApplicationError::Configuration(_) => EXIT_CONFIG,
            ApplicationError::Domain(_) | ApplicationError::Input(_) => EXIT_INPUT,
        };
        Self::failure(command, error.error_class(), error.to_string(), exit_code)
    }

    fn with_data<T: Serialize>(
        command: &str,
        status: &str,
        error_class: Option<&str>,
        message: String,
        data: Option<T>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: error_class.map(str::to_string),
            message,
            data,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

fn serialize_payload<T: Serialize>(payload: &CommandOutcome<T>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config() -> Result<AppConfig, ApplicationError> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| ApplicationError::Configuration(error.to_string()))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read `{}`: {error}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        ApplicationError::Input(format!("could not parse `{}`: {error}", path.display()))
    })
}
