//! Food catalog (菜单)
//!
//! Static lookup of food items and categories. Only the active category
//! changes during a session.

use crate::outcome::{CommandOutcome, IgnoredReason};
use shared::models::{Category, FoodItem, SizeOption};

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    items: Vec<FoodItem>,
    active_category: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    pub fn new(categories: Vec<Category>, items: Vec<FoodItem>) -> Self {
        let active_category = categories
            .iter()
            .find(|c| c.active)
            .or_else(|| categories.first())
            .map(|c| c.id.clone())
            .unwrap_or_default();
        let mut catalog = Self {
            categories,
            items,
            active_category: String::new(),
        };
        catalog.mark_active(&active_category);
        catalog
    }

    /// Built-in menu: four categories, four dishes
    pub fn seeded() -> Self {
        Self::new(seed_categories(), seed_items())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn find_item(&self, id: &str) -> Option<&FoodItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items whose category name matches
    pub fn items_in_category(&self, category_name: &str) -> Vec<&FoodItem> {
        self.items
            .iter()
            .filter(|i| i.category == category_name)
            .collect()
    }

    pub fn active_category(&self) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == self.active_category)
    }

    pub fn active_category_id(&self) -> &str {
        &self.active_category
    }

    /// Items of the active category
    pub fn active_items(&self) -> Vec<&FoodItem> {
        match self.active_category() {
            Some(c) => self.items_in_category(&c.name),
            None => Vec::new(),
        }
    }

    pub fn set_active_category(&mut self, category_id: &str) -> CommandOutcome {
        if !self.categories.iter().any(|c| c.id == category_id) {
            return IgnoredReason::CategoryNotFound.into();
        }
        if self.active_category == category_id {
            return IgnoredReason::NoChange.into();
        }
        self.mark_active(category_id);
        CommandOutcome::Applied
    }

    fn mark_active(&mut self, category_id: &str) {
        for c in &mut self.categories {
            c.active = c.id == category_id;
        }
        self.active_category = category_id.to_string();
    }
}

fn seed_categories() -> Vec<Category> {
    [
        ("1", "Appetizers"),
        ("2", "Main Course"),
        ("3", "Desserts"),
        ("4", "Beverages"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
        active: id == "1",
    })
    .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn sizes(values: &[(&str, f64)]) -> Vec<SizeOption> {
    values
        .iter()
        .map(|(size, price)| SizeOption {
            size: size.to_string(),
            price: *price,
        })
        .collect()
}

fn seed_items() -> Vec<FoodItem> {
    vec![
        FoodItem {
            id: "1".to_string(),
            name: "Caesar Salad".to_string(),
            description: "Fresh romaine lettuce with parmesan cheese and croutons".to_string(),
            price: 12.99,
            image: Some("/caesar-salad.png".to_string()),
            category: "Appetizers".to_string(),
            protein_options: strings(&["Chicken", "Shrimp", "None"]),
            size_options: sizes(&[("Small", 12.99), ("Large", 16.99)]),
            spice_levels: strings(&["Mild"]),
            dietary_preferences: strings(&["Vegetarian Option", "Gluten-Free Option"]),
        },
        FoodItem {
            id: "2".to_string(),
            name: "Grilled Salmon".to_string(),
            description: "Fresh Atlantic salmon with herbs and lemon".to_string(),
            price: 24.99,
            image: Some("/grilled-salmon-plate.png".to_string()),
            category: "Main Course".to_string(),
            protein_options: strings(&["Salmon"]),
            size_options: sizes(&[("6oz", 24.99), ("8oz", 28.99)]),
            spice_levels: strings(&["Mild", "Medium"]),
            dietary_preferences: strings(&["Gluten-Free", "Keto-Friendly"]),
        },
        FoodItem {
            id: "3".to_string(),
            name: "Chocolate Cake".to_string(),
            description: "Rich chocolate cake with vanilla ice cream".to_string(),
            price: 8.99,
            image: Some("/decadent-chocolate-cake.png".to_string()),
            category: "Desserts".to_string(),
            protein_options: Vec::new(),
            size_options: sizes(&[("Regular", 8.99), ("Large", 12.99)]),
            spice_levels: strings(&["None"]),
            dietary_preferences: strings(&["Vegetarian"]),
        },
        FoodItem {
            id: "4".to_string(),
            name: "Fresh Lemonade".to_string(),
            description: "Freshly squeezed lemonade with mint".to_string(),
            price: 4.99,
            image: Some("/fresh-lemonade.png".to_string()),
            category: "Beverages".to_string(),
            protein_options: Vec::new(),
            size_options: sizes(&[("Small", 4.99), ("Large", 6.99)]),
            spice_levels: strings(&["None"]),
            dietary_preferences: strings(&["Vegan", "Gluten-Free"]),
        },
    ]
}
