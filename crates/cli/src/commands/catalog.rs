use ratedesk_core::pricing::catalog::{search, templates_in_group};
use ratedesk_core::{CatalogEntry, PromotionGroup, PROMOTION_CATALOG};

use crate::commands::CommandResult;

const ALL_GROUPS: [PromotionGroup; 3] =
    [PromotionGroup::Seasonal, PromotionGroup::Essential, PromotionGroup::Targeted];

pub fn run(group: Option<PromotionGroup>, query: Option<&str>) -> CommandResult {
    let entries: Vec<&CatalogEntry> = match (group, query) {
        (Some(group), Some(query)) => search(group, query),
        (Some(group), None) => templates_in_group(group).collect(),
        (None, Some(query)) => {
            ALL_GROUPS.into_iter().flat_map(|group| search(group, query)).collect()
        }
        (None, None) => PROMOTION_CATALOG.iter().collect(),
    };

    let message = format!("{} catalog entries", entries.len());
    CommandResult::success_with("catalog", message, entries)
}
