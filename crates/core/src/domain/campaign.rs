use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CampaignId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcType {
    /// Applied against the running, already-discounted price.
    Progressive,
    /// Applied against the original BAR.
    Additive,
}

impl CalcType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Progressive => "PROGRESSIVE",
            Self::Additive => "ADDITIVE",
        }
    }
}

/// A discount campaign for the generic stacking engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub id: Option<CampaignId>,
    pub name: String,
    pub discount_value: Decimal,
    pub calc_type: CalcType,
    pub apply_order: i32,
    #[serde(default)]
    pub incompatible_with: BTreeSet<CampaignId>,
}

impl Campaign {
    pub fn new(
        name: impl Into<String>,
        discount_value: Decimal,
        calc_type: CalcType,
        apply_order: i32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            discount_value,
            calc_type,
            apply_order,
            incompatible_with: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(CampaignId(id.into()));
        self
    }

    pub fn incompatible_with(mut self, id: impl Into<String>) -> Self {
        self.incompatible_with.insert(CampaignId(id.into()));
        self
    }

    pub fn conflicts_with(&self, other: &Campaign) -> bool {
        let listed = |from: &Campaign, to: &Campaign| {
            to.id.as_ref().is_some_and(|id| from.incompatible_with.contains(id))
        };
        listed(self, other) || listed(other, self)
    }
}
