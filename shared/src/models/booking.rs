//! Booking Model

use super::person::Person;
use serde::{Deserialize, Serialize};

/// Booking type (预订类型)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    /// One guest per seat, names and pre-orders per person
    #[default]
    Individual,
    /// Whole party ordering from the shared cart
    Group,
}

/// Workflow step, in forward order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStep {
    #[default]
    TableSelection,
    SeatSelection,
    PersonDetails,
    FoodSelection,
    Confirmation,
}

impl BookingStep {
    pub const ALL: [BookingStep; 5] = [
        BookingStep::TableSelection,
        BookingStep::SeatSelection,
        BookingStep::PersonDetails,
        BookingStep::FoodSelection,
        BookingStep::Confirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::TableSelection => "table-selection",
            BookingStep::SeatSelection => "seat-selection",
            BookingStep::PersonDetails => "person-details",
            BookingStep::FoodSelection => "food-selection",
            BookingStep::Confirmation => "confirmation",
        }
    }

    /// Zero-based position in the forward order
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for BookingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
}

/// Booking aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub table_id: String,
    pub booking_type: BookingType,
    pub number_of_people: u32,
    /// Frozen copy of the party, filled in at confirmation
    #[serde(default)]
    pub people: Vec<Person>,
    pub booked_seats: Vec<u32>,
    pub status: BookingStatus,
    /// Unix millis
    pub created_at: i64,
}

impl Booking {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert!(BookingStep::TableSelection < BookingStep::SeatSelection);
        assert!(BookingStep::FoodSelection < BookingStep::Confirmation);
        assert_eq!(BookingStep::PersonDetails.index(), 2);
        for (i, step) in BookingStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }

    #[test]
    fn test_step_serde_matches_display() {
        for step in BookingStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{}\"", step));
        }
        let step: BookingStep = serde_json::from_str("\"food-selection\"").unwrap();
        assert_eq!(step, BookingStep::FoodSelection);
    }

    #[test]
    fn test_type_and_status_serde() {
        assert_eq!(serde_json::to_string(&BookingType::Group).unwrap(), "\"group\"");
        assert_eq!(
            serde_json::to_string(&BookingStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }
}
