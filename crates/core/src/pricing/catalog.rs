use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::promotion::PromotionGroup::{Essential, Seasonal, Targeted};
use crate::domain::promotion::TargetSubCategory::{BedsNetwork, Geography, Loyalty, Platform, Product};
use crate::domain::promotion::{PromotionGroup, PromotionTemplate, TargetSubCategory, TemplateId};

/// Static description of a channel promotion the picker offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub group: PromotionGroup,
    pub sub_category: Option<TargetSubCategory>,
    pub default_percent: Option<Decimal>,
    pub description: &'static str,
}

impl CatalogEntry {
    const fn new(
        id: &'static str,
        name: &'static str,
        group: PromotionGroup,
        sub_category: Option<TargetSubCategory>,
        description: &'static str,
    ) -> Self {
        Self { id, name, group, sub_category, default_percent: None, description }
    }

    /// A `None` default leaves the percent to be entered by hand.
    pub fn to_template(&self) -> PromotionTemplate {
        PromotionTemplate {
            id: TemplateId(self.id.to_string()),
            name: self.name.to_string(),
            group: self.group,
            sub_category: self.sub_category,
            default_percent: self.default_percent,
            description: Some(self.description.to_string()),
        }
    }
}

pub static PROMOTION_CATALOG: [CatalogEntry; 17] = [
    CatalogEntry::new(
        "agoda-seasonal-double-day",
        "Double Day Sale",
        Seasonal,
        None,
        "Double-date campaigns (10/10, 11/11, 12/12...)",
    ),
    CatalogEntry::new(
        "agoda-seasonal-payday",
        "Payday Sale",
        Seasonal,
        None,
        "End-of-month sale around payday",
    ),
    CatalogEntry::new(
        "agoda-seasonal-night-owl",
        "Night Owl Sale",
        Seasonal,
        None,
        "Late-night booking deals",
    ),
    CatalogEntry::new("agoda-seasonal-summer", "Summer Vibes", Seasonal, None, "Summer campaign"),
    CatalogEntry::new(
        "agoda-seasonal-abroad",
        "Deals Abroad",
        Seasonal,
        None,
        "Offers aimed at overseas markets",
    ),
    CatalogEntry::new(
        "agoda-essential-early-bird",
        "Early Bird",
        Essential,
        None,
        "Advance-purchase deal (e.g. 14 days ahead)",
    ),
    CatalogEntry::new(
        "agoda-essential-last-minute",
        "Last-Minute",
        Essential,
        None,
        "Last-minute deal",
    ),
    CatalogEntry::new(
        "agoda-essential-long-stay",
        "Long Stay",
        Essential,
        None,
        "Deal for guests staying many nights",
    ),
    CatalogEntry::new(
        "agoda-essential-occupancy",
        "Occupancy Promotion",
        Essential,
        None,
        "Promotion driven by room occupancy",
    ),
    CatalogEntry::new(
        "agoda-essential-customized",
        "Customized Promotion",
        Essential,
        None,
        "Custom promotion with a stacking option",
    ),
    CatalogEntry::new(
        "agoda-targeted-vip-silver",
        "VIP Silver",
        Targeted,
        Some(Loyalty),
        "For VIP Silver members",
    ),
    CatalogEntry::new(
        "agoda-targeted-vip-gold",
        "VIP Gold",
        Targeted,
        Some(Loyalty),
        "For VIP Gold members",
    ),
    CatalogEntry::new(
        "agoda-targeted-vip-platinum",
        "VIP Platinum",
        Targeted,
        Some(Loyalty),
        "For VIP Platinum members",
    ),
    CatalogEntry::new(
        "agoda-targeted-mobile",
        "Mobile Users",
        Targeted,
        Some(Platform),
        "Mobile-app-only offer",
    ),
    CatalogEntry::new(
        "agoda-targeted-geo",
        "Country/Geo Target",
        Targeted,
        Some(Geography),
        "Offer limited to selected territories",
    ),
    CatalogEntry::new(
        "agoda-targeted-package",
        "Package / Bundle Product",
        Targeted,
        Some(Product),
        "Offer when booked with a service package",
    ),
    CatalogEntry::new(
        "agoda-targeted-beds",
        "Beds Network",
        Targeted,
        Some(BedsNetwork),
        "Partner network promotion",
    ),
];

pub fn find_template(id: &str) -> Option<&'static CatalogEntry> {
    PROMOTION_CATALOG.iter().find(|entry| entry.id == id)
}

pub fn templates_in_group(group: PromotionGroup) -> impl Iterator<Item = &'static CatalogEntry> {
    PROMOTION_CATALOG.iter().filter(move |entry| entry.group == group)
}

/// Entries of `group` whose name contains `query`, ignoring case.
pub fn search(group: PromotionGroup, query: &str) -> Vec<&'static CatalogEntry> {
    let needle = query.trim().to_lowercase();
    templates_in_group(group).filter(|entry| entry.name.to_lowercase().contains(&needle)).collect()
}
