use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Template id of the essential promotion that may opt out of stacking with its siblings.
pub const CUSTOMIZED_ESSENTIAL_ID: &str = "agoda-essential-customized";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionGroup {
    Seasonal,
    Essential,
    Targeted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSubCategory {
    Product,
    Loyalty,
    Geography,
    Platform,
    BedsNetwork,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    Progressive,
    #[default]
    Additive,
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PromotionGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seasonal => "seasonal",
            Self::Essential => "essential",
            Self::Targeted => "targeted",
        }
    }
}

impl TargetSubCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Loyalty => "loyalty",
            Self::Geography => "geography",
            Self::Platform => "platform",
            Self::BedsNetwork => "beds_network",
        }
    }
}

impl CalculationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Progressive => "progressive",
            Self::Additive => "additive",
        }
    }
}

impl std::fmt::Display for TargetSubCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PromotionGroup {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "seasonal" => Ok(Self::Seasonal),
            "essential" => Ok(Self::Essential),
            "targeted" => Ok(Self::Targeted),
            other => Err(format!(
                "unsupported promotion group `{other}` (expected seasonal|essential|targeted)"
            )),
        }
    }
}

impl std::str::FromStr for CalculationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "progressive" => Ok(Self::Progressive),
            "additive" => Ok(Self::Additive),
            other => Err(format!(
                "unsupported calculation mode `{other}` (expected progressive|additive)"
            )),
        }
    }
}

/// Reference description of a promotion a channel offers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionTemplate {
    pub id: TemplateId,
    pub name: String,
    pub group: PromotionGroup,
    pub sub_category: Option<TargetSubCategory>,
    pub default_percent: Option<Decimal>,
    pub description: Option<String>,
}

/// A template attached to one pricing configuration, with its own percent and toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionInstance {
    pub instance_id: InstanceId,
    pub template: PromotionTemplate,
    pub percent: Decimal,
    pub is_enabled: bool,
    pub apply_order: i32,
    #[serde(default)]
    pub allow_stack_with_other_essential: Option<bool>,
}

impl PromotionInstance {
    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn group(&self) -> PromotionGroup {
        self.template.group
    }

    pub fn sub_category(&self) -> Option<TargetSubCategory> {
        self.template.sub_category
    }

    pub fn is_customized_essential(&self) -> bool {
        self.template.id.0 == CUSTOMIZED_ESSENTIAL_ID
    }

    /// True when this is the enabled customized essential configured to block its siblings.
    pub fn excludes_other_essentials(&self) -> bool {
        self.is_enabled
            && self.is_customized_essential()
            && self.allow_stack_with_other_essential == Some(false)
    }
}
