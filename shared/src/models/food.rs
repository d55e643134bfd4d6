//! Food Catalog Model

use serde::{Deserialize, Serialize};

/// Size variant with its own price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    pub size: String,
    pub price: f64,
}

/// Food item entity (菜品)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Category name (e.g. "Appetizers")
    pub category: String,
    #[serde(default)]
    pub protein_options: Vec<String>,
    #[serde(default)]
    pub size_options: Vec<SizeOption>,
    #[serde(default)]
    pub spice_levels: Vec<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

impl FoodItem {
    /// Unit price for the chosen size, falling back to the base price
    pub fn price_for_size(&self, size: Option<&str>) -> f64 {
        size.and_then(|s| self.size_options.iter().find(|o| o.size == s))
            .map(|o| o.price)
            .unwrap_or(self.price)
    }

    /// First option of every list, as a UI would preselect them
    pub fn default_options(&self) -> ItemOptions {
        ItemOptions {
            protein: self.protein_options.first().cloned(),
            size: self.size_options.first().map(|o| o.size.clone()),
            spice: self.spice_levels.first().cloned(),
            dietary_preferences: Vec::new(),
        }
    }
}

/// Menu category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Chosen variant of a food item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spice: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

impl ItemOptions {
    /// Option signature used to tell cart lines of the same item apart:
    /// `protein-size-spice-diet1,diet2` (missing parts are empty).
    pub fn signature(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.protein.as_deref().unwrap_or(""),
            self.size.as_deref().unwrap_or(""),
            self.spice.as_deref().unwrap_or(""),
            self.dietary_preferences.join(",")
        )
    }
}

/// The part of a food item copied onto an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRef {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FoodRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            category: None,
        }
    }
}

impl From<&FoodItem> for FoodRef {
    fn from(item: &FoodItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            category: Some(item.category.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salad() -> FoodItem {
        FoodItem {
            id: "1".to_string(),
            name: "Caesar Salad".to_string(),
            description: String::new(),
            price: 12.99,
            image: None,
            category: "Appetizers".to_string(),
            protein_options: vec!["Chicken".to_string(), "Shrimp".to_string()],
            size_options: vec![
                SizeOption {
                    size: "Small".to_string(),
                    price: 12.99,
                },
                SizeOption {
                    size: "Large".to_string(),
                    price: 16.99,
                },
            ],
            spice_levels: vec!["Mild".to_string()],
            dietary_preferences: vec![],
        }
    }

    #[test]
    fn test_price_for_size() {
        let item = salad();
        assert_eq!(item.price_for_size(Some("Large")), 16.99);
        assert_eq!(item.price_for_size(Some("Huge")), 12.99);
        assert_eq!(item.price_for_size(None), 12.99);
    }

    #[test]
    fn test_signature() {
        let opts = ItemOptions {
            protein: Some("Chicken".to_string()),
            size: Some("Large".to_string()),
            spice: Some("Mild".to_string()),
            dietary_preferences: vec!["Vegetarian Option".to_string(), "Gluten-Free Option".to_string()],
        };
        assert_eq!(
            opts.signature(),
            "Chicken-Large-Mild-Vegetarian Option,Gluten-Free Option"
        );
        assert_eq!(ItemOptions::default().signature(), "---");
    }

    #[test]
    fn test_default_options_pick_first() {
        let opts = salad().default_options();
        assert_eq!(opts.protein.as_deref(), Some("Chicken"));
        assert_eq!(opts.size.as_deref(), Some("Small"));
        assert!(opts.dietary_preferences.is_empty());
    }

    #[test]
    fn test_food_ref_from_item() {
        let food = FoodRef::from(&salad());
        assert_eq!(food.id, "1");
        assert_eq!(food.category.as_deref(), Some("Appetizers"));
    }
}
