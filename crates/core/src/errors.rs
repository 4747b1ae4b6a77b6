use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::promotion::{InstanceId, TemplateId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("percent {0} is outside 0..=100")]
    PercentOutOfRange(Decimal),
    #[error("promotion template `{template_id}` has no default percent; enter one manually")]
    PercentRequired { template_id: TemplateId },
    #[error("unknown promotion instance `{0}`")]
    UnknownPromotionInstance(InstanceId),
    #[error("unknown promotion template `{0}`")]
    UnknownTemplate(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("input failure: {0}")]
    Input(String),
}

impl ApplicationError {
    /// Stable label for structured command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Configuration(_) => "config_validation",
            Self::Input(_) => "input",
        }
    }
}
