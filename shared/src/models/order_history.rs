//! Order History Model

use serde::{Deserialize, Serialize};

/// Label used for shared-cart lines that carry no person name
pub const GROUP_ORDER_LABEL: &str = "Group Order";

/// Category stamped on shared-cart lines in the history
pub const CART_ITEM_CATEGORY: &str = "Cart Item";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderHistoryStatus {
    #[default]
    Completed,
    Pending,
}

/// Flattened line of a completed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryItem {
    pub item_id: String,
    pub name: String,
    /// Amount of this line (unit price × quantity)
    pub price: f64,
    /// Units this line stands for (pre-order units are expanded to 1 each)
    pub quantity: u32,
    pub person_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Completed order, append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
    pub id: String,
    pub table_number: u32,
    pub booking_id: String,
    pub items: Vec<OrderHistoryItem>,
    pub total: f64,
    /// Unix millis
    pub date: i64,
    pub status: OrderHistoryStatus,
}

impl OrderHistoryEntry {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
