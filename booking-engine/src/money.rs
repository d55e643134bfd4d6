//! Money calculation utilities using rust_decimal for precision
//!
//! Prices live as `f64` in the models. Every sum and product goes through
//! `Decimal`, then is rounded back to two places for storage.

use rust_decimal::prelude::*;
use shared::models::{FoodSelection, OrderLine};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a Decimal to 2 places without leaving Decimal
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// unit price × quantity
pub fn line_total(unit_price: f64, quantity: u32) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Σ price × quantity over order lines
pub fn lines_subtotal<'a>(lines: impl IntoIterator<Item = &'a OrderLine>) -> f64 {
    let total: Decimal = lines
        .into_iter()
        .map(|l| line_total(l.food.price, l.quantity))
        .sum();
    to_f64(total)
}

/// Σ price × quantity over a person's selections
pub fn selections_subtotal(selections: &[FoodSelection]) -> f64 {
    let total: Decimal = selections
        .iter()
        .map(|s| line_total(s.food.price, s.quantity))
        .sum();
    to_f64(total)
}

/// Sum plain amounts with decimal precision
pub fn sum_amounts(amounts: impl IntoIterator<Item = f64>) -> f64 {
    let total: Decimal = amounts.into_iter().map(to_decimal).sum();
    to_f64(total)
}

/// Whether two amounts are equal within one cent
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::FoodRef;

    #[test]
    fn test_line_total_is_exact() {
        assert_eq!(to_f64(line_total(12.99, 2)), 25.98);
        assert_eq!(to_f64(line_total(0.1, 3)), 0.3);
    }

    #[test]
    fn test_to_f64_rounds_half_away_from_zero() {
        assert_eq!(to_f64(Decimal::new(1005, 3)), 1.01);
        assert_eq!(to_f64(Decimal::new(-1005, 3)), -1.01);
    }

    #[test]
    fn test_selections_subtotal() {
        let selections = vec![
            FoodSelection {
                food: FoodRef::new("1", "Caesar Salad", 12.99),
                quantity: 2,
            },
            FoodSelection {
                food: FoodRef::new("4", "Fresh Lemonade", 4.99),
                quantity: 1,
            },
        ];
        assert_eq!(selections_subtotal(&selections), 30.97);
    }

    #[test]
    fn test_sum_amounts_and_eq() {
        assert_eq!(sum_amounts([0.1, 0.2]), 0.3);
        assert!(money_eq(0.1 + 0.2, 0.3));
        assert!(!money_eq(1.0, 1.02));
    }
}
