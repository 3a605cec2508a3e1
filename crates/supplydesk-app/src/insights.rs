// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use supplydesk_grid::format_money;

use crate::ids::InventoryItemId;
use crate::model::InventoryItem;

/// Most recommendations shown at once.
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Excess starts above `max_level * 6 / 5`, i.e. 20% over the ceiling.
const EXCESS_NUMERATOR: i128 = 6;
const EXCESS_DENOMINATOR: i128 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Reorder,
    Excess,
}

impl RecommendationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reorder => "reorder",
            Self::Excess => "excess",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reorder => "Reorder",
            Self::Excess => "Excess Stock",
        }
    }

    pub const fn suggested_action(self) -> &'static str {
        match self {
            Self::Reorder => "Place order immediately",
            Self::Excess => "Consider transferring to another location",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// `<kind>-<item id>`, unique per item and kind.
    pub id: String,
    pub kind: RecommendationKind,
    pub item_id: InventoryItemId,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub impact: String,
    /// Value of stock above the ceiling. Excess only.
    pub potential_savings_cents: Option<i64>,
}

impl Recommendation {
    fn reorder(item: &InventoryItem) -> Self {
        Self::new(
            RecommendationKind::Reorder,
            item,
            format!(
                "Stock level ({}) is below reorder point ({})",
                item.quantity, item.reorder_point
            ),
            format!("Lead time: {} days", item.lead_time_days),
            None,
        )
    }

    fn excess(item: &InventoryItem) -> Self {
        let savings = (item.quantity - item.max_level).saturating_mul(item.unit_cost_cents);
        Self::new(
            RecommendationKind::Excess,
            item,
            format!(
                "Stock level ({}) is significantly above maximum ({})",
                item.quantity, item.max_level
            ),
            format!("Excess inventory value: {}", format_money(savings)),
            Some(savings),
        )
    }

    fn new(
        kind: RecommendationKind,
        item: &InventoryItem,
        description: String,
        impact: String,
        potential_savings_cents: Option<i64>,
    ) -> Self {
        Self {
            id: format!("{}-{}", kind.as_str(), item.id),
            kind,
            item_id: item.id.clone(),
            sku: item.sku.clone(),
            name: item.name.clone(),
            description,
            impact,
            potential_savings_cents,
        }
    }

    /// One status-line style summary.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} ({}) | {} | {}",
            self.kind.label(),
            self.name,
            self.sku,
            self.description,
            self.impact
        )
    }
}

fn is_excess(item: &InventoryItem) -> bool {
    i128::from(item.quantity) * EXCESS_DENOMINATOR > i128::from(item.max_level) * EXCESS_NUMERATOR
}

/// Reorder and excess-stock recommendations in item order, reorder before
/// excess for the same item, capped at [`RECOMMENDATION_LIMIT`].
pub fn recommendations(items: &[InventoryItem]) -> Vec<Recommendation> {
    items
        .iter()
        .flat_map(|item| {
            let reorder = item.needs_reorder().then(|| Recommendation::reorder(item));
            let excess = is_excess(item).then(|| Recommendation::excess(item));
            reorder.into_iter().chain(excess)
        })
        .take(RECOMMENDATION_LIMIT)
        .collect()
}
