//! Order Line Model
//!
//! A single collection of order lines covers both the shared cart and the
//! per-person pre-orders of an individual booking. Each line carries its
//! owner (optional person) and its [`LineSource`]; the per-person
//! [`FoodSelection`] list is a view over the `PreOrder` lines of a person.

use super::food::{FoodRef, ItemOptions};
use serde::{Deserialize, Serialize};

/// Which list a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    /// Per-person selection made during the food-selection step
    PreOrder,
    /// Shared / group cart
    #[default]
    Cart,
}

/// Uniqueness key of an order line
///
/// Two lines with the same item id stay separate when their option
/// signature, owning person or source differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub item_id: String,
    pub option_key: Option<String>,
    pub person_id: Option<String>,
    pub source: LineSource,
}

/// Order line (订单行)
///
/// Serialized in the cart item layout:
/// `{ id, name, price, quantity, image?, optionKey?, options?, personId?, personName?, tableId? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(flatten)]
    pub food: FoodRef,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ItemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default)]
    pub source: LineSource,
}

impl OrderLine {
    /// Shared-cart line built from an add command
    pub fn from_input(input: CartItemInput) -> Self {
        let option_key = input
            .option_key
            .or_else(|| input.options.as_ref().map(ItemOptions::signature));
        Self {
            food: input.food,
            quantity: input.quantity.max(1),
            option_key,
            options: input.options,
            person_id: input.person_id,
            person_name: input.person_name,
            table_id: input.table_id,
            source: LineSource::Cart,
        }
    }

    /// Per-person pre-order line
    pub fn pre_order(
        person_id: impl Into<String>,
        food: FoodRef,
        quantity: u32,
        table_id: Option<String>,
    ) -> Self {
        Self {
            food,
            quantity,
            option_key: None,
            options: None,
            person_id: Some(person_id.into()),
            person_name: None,
            table_id,
            source: LineSource::PreOrder,
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey {
            item_id: self.food.id.clone(),
            option_key: self.option_key.clone(),
            person_id: self.person_id.clone(),
            source: self.source,
        }
    }

    pub fn is_pre_order(&self) -> bool {
        self.source == LineSource::PreOrder
    }

    /// Whether the line is visible for a table: lines without a table show everywhere
    pub fn belongs_to_table(&self, table_id: &str) -> bool {
        self.table_id.as_deref().is_none_or(|t| t == table_id)
    }

    pub fn to_selection(&self) -> FoodSelection {
        FoodSelection {
            food: self.food.clone(),
            quantity: self.quantity,
        }
    }
}

/// Input of the add-to-cart command; quantity defaults to 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    #[serde(flatten)]
    pub food: FoodRef,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub option_key: Option<String>,
    #[serde(default)]
    pub options: Option<ItemOptions>,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub table_id: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl CartItemInput {
    pub fn new(food: FoodRef) -> Self {
        Self {
            food,
            quantity: 1,
            option_key: None,
            options: None,
            person_id: None,
            person_name: None,
            table_id: None,
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn options(mut self, options: ItemOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn person(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.person_id = Some(id.into());
        self.person_name = Some(name.into());
        self
    }

    pub fn table(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }
}

/// A (food item, quantity) pair scoped to one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSelection {
    #[serde(flatten)]
    pub food: FoodRef,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_key_from_options() {
        let input = CartItemInput::new(FoodRef::new("1", "Caesar Salad", 12.99)).options(ItemOptions {
            protein: Some("Chicken".to_string()),
            size: Some("Small".to_string()),
            spice: Some("Mild".to_string()),
            dietary_preferences: vec![],
        });
        let line = OrderLine::from_input(input);
        assert_eq!(line.option_key.as_deref(), Some("Chicken-Small-Mild-"));
        assert_eq!(line.source, LineSource::Cart);
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_zero_quantity_input_becomes_one() {
        let line = OrderLine::from_input(CartItemInput::new(FoodRef::new("1", "x", 1.0)).quantity(0));
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_key_distinguishes_source() {
        let food = FoodRef::new("1", "Caesar Salad", 12.99);
        let pre = OrderLine::pre_order("p1", food.clone(), 1, None);
        let cart = OrderLine::from_input(CartItemInput::new(food).person("p1", "Alice"));
        assert_ne!(pre.key(), cart.key());
    }

    #[test]
    fn test_belongs_to_table() {
        let mut line = OrderLine::from_input(CartItemInput::new(FoodRef::new("1", "x", 1.0)));
        assert!(line.belongs_to_table("3"));
        line.table_id = Some("2".to_string());
        assert!(!line.belongs_to_table("3"));
        assert!(line.belongs_to_table("2"));
    }

    #[test]
    fn test_cart_item_layout() {
        let line = OrderLine::from_input(
            CartItemInput::new(FoodRef::new("4", "Fresh Lemonade", 4.99))
                .quantity(2)
                .person("p1", "Alice")
                .table("1"),
        );
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "4");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["personName"], "Alice");
        assert_eq!(json["tableId"], "1");

        // Lines written without a source are shared-cart lines
        let back: OrderLine =
            serde_json::from_str(r#"{"id":"4","name":"Fresh Lemonade","price":4.99,"quantity":2}"#).unwrap();
        assert_eq!(back.source, LineSource::Cart);
    }

    #[test]
    fn test_selection_layout() {
        let sel = FoodSelection {
            food: FoodRef::new("1", "Caesar Salad", 12.99),
            quantity: 2,
        };
        let json = serde_json::to_value(&sel).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["quantity"], 2);
        assert!(json.get("image").is_none());
    }
}
