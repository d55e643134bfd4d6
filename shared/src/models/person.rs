//! Person Model

use super::order_line::FoodSelection;
use serde::{Deserialize, Serialize};

/// One guest of an individual booking, bound to a seat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    /// Empty until the person-details step is filled in
    pub name: String,
    pub seat_number: u32,
    pub table_id: String,
}

impl Person {
    pub fn new(id: impl Into<String>, seat_number: u32, table_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            seat_number,
            table_id: table_id.into(),
        }
    }

    /// Whether a (non-blank) name has been entered
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Persisted per-person selection record: `{ id, foodSelections }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSelections {
    pub id: String,
    #[serde(default)]
    pub food_selections: Vec<FoodSelection>,
}

/// Person with their derived selection list, as exposed to UI screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    #[serde(flatten)]
    pub person: Person,
    pub food_selections: Vec<FoodSelection>,
    /// Σ quantity over `food_selections`
    pub item_count: u32,
}
