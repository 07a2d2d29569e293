//! Order and reconciliation models

use serde::{Deserialize, Serialize};

/// A single line item of a completed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Product name (matched case-insensitively against the catalog)
    pub name: String,
    pub quantity: i64,
    /// Category as captured at order time
    #[serde(default)]
    pub category: Option<String>,
    /// Unit price in dollars, as captured at order time
    #[serde(default)]
    pub price: Option<f64>,
}

/// Outcome of applying one line item to inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Full requested quantity was decremented
    Applied,
    /// Stock hit zero before the full quantity; remainder dropped
    Clamped,
    /// No product with this name
    NotFound,
}

/// Per-item reconciliation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub name: String,
    pub requested: i64,
    /// Quantity actually decremented (0 for NotFound)
    pub applied: i64,
    pub status: ItemStatus,
}

/// Result of reconciling a completed order against inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub order_id: String,
    /// True when this order id was already reconciled; nothing was mutated
    pub replayed: bool,
    /// Oyster quantity added to the harvest counter by this call
    pub harvested: i64,
    pub items: Vec<ItemOutcome>,
}

impl ReconciliationResult {
    /// An empty result for a replayed order
    pub fn replay(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            replayed: true,
            harvested: 0,
            items: Vec::new(),
        }
    }
}
