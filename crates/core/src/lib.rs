pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::campaign::{CalcType, Campaign, CampaignId};
pub use domain::promotion::{
    CalculationMode, InstanceId, PromotionGroup, PromotionInstance, PromotionTemplate,
    TargetSubCategory, TemplateId, CUSTOMIZED_ESSENTIAL_ID,
};
pub use domain::settings::{ChannelPricingSettings, GroupSummary};
pub use errors::{ApplicationError, DomainError};
pub use pricing::catalog::{CatalogEntry, PROMOTION_CATALOG};
pub use pricing::channel::{
    channel_bar_from_net, channel_net_from_bar, resolve_active_set, CalculationResult,
    ChannelEngine, DeterministicChannelEngine, TraceStep,
};
pub use pricing::stacking::{
    bar_from_net, net_from_bar, pricing_breakdown, validate_campaigns, BreakdownStep,
    DeterministicStackingEngine, NetQuote, PricingBreakdown, StackingEngine,
};
pub use pricing::validator::{
    validate_stack, DeterministicStackValidator, StackValidation, StackValidator,
};
