//! Bill split (分账)
//!
//! Three ways to share a total between payers: equal parts, custom
//! amounts, or per-item quantities. Results only describe who owes what.

use crate::money::{round_money, to_f64};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

pub const MIN_PAYERS: usize = 2;
pub const MAX_PAYERS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayerShare {
    pub name: String,
    pub amount: f64,
}

fn payer_name(index: usize) -> String {
    format!("Payer {}", index + 1)
}

fn invalid_amount(field: &str, value: f64) -> AppError {
    AppError::with_message(ErrorCode::InvalidAmount, format!("Invalid {field} {value}"))
        .with_detail("field", field)
}

/// Finite, not negative and representable as `Decimal`
fn check_amount(value: f64, field: &str) -> AppResult<Decimal> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid_amount(field, value));
    }
    Decimal::from_f64(value).ok_or_else(|| invalid_amount(field, value))
}

fn overflow(field: &str) -> AppError {
    AppError::with_message(ErrorCode::InvalidAmount, format!("Amount out of range in {field}"))
        .with_detail("field", field)
}

/// price × quantity, then added to `acc`
fn add_line(acc: Decimal, price: Decimal, quantity: u32, field: &str) -> AppResult<Decimal> {
    price
        .checked_mul(Decimal::from(quantity))
        .and_then(|line| acc.checked_add(line))
        .ok_or_else(|| overflow(field))
}

fn check_total(total: f64) -> AppResult<Decimal> {
    check_amount(total, "total")
}

/// Split `total` into `payers` equal shares
///
/// Every share is rounded to cents; the last payer absorbs the remainder so
/// the shares always add up to the total.
pub fn equal_split(total: f64, payers: usize) -> AppResult<Vec<PayerShare>> {
    if !(MIN_PAYERS..=MAX_PAYERS).contains(&payers) {
        return Err(AppError::with_message(
            ErrorCode::InvalidShares,
            format!("Payer count must be between {MIN_PAYERS} and {MAX_PAYERS}"),
        )
        .with_detail("payers", payers));
    }
    let total = check_total(total)?;
    let share = round_money(total / Decimal::from(payers as u64));
    let last = total - share * Decimal::from(payers as u64 - 1);

    Ok((0..payers)
        .map(|i| PayerShare {
            name: payer_name(i),
            amount: to_f64(if i + 1 == payers { last } else { share }),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomSplit {
    pub shares: Vec<PayerShare>,
    pub assigned: f64,
    /// Negative when the payers cover more than the total
    pub remaining: f64,
}

impl CustomSplit {
    pub fn is_settled(&self) -> bool {
        self.remaining == 0.0
    }
}

/// Split `total` by amounts typed in per payer
pub fn custom_split(total: f64, amounts: &[f64]) -> AppResult<CustomSplit> {
    let total = check_total(total)?;
    let mut assigned = Decimal::ZERO;
    let mut shares = Vec::with_capacity(amounts.len());
    for (i, &amount) in amounts.iter().enumerate() {
        let field = format!("amounts[{i}]");
        let amount = check_amount(amount, &field)?;
        assigned = assigned.checked_add(amount).ok_or_else(|| overflow(&field))?;
        shares.push(PayerShare {
            name: payer_name(i),
            amount: to_f64(amount),
        });
    }

    Ok(CustomSplit {
        shares,
        assigned: to_f64(assigned),
        remaining: to_f64(total.checked_sub(assigned).ok_or_else(|| overflow("remaining"))?),
    })
}

/// Ordered item available for a by-items split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

/// Quantities one payer takes, keyed by item id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayerAssignment {
    pub payer: String,
    pub quantities: HashMap<String, u32>,
}

impl PayerAssignment {
    pub fn new(payer: impl Into<String>) -> Self {
        Self {
            payer: payer.into(),
            quantities: HashMap::new(),
        }
    }

    pub fn take(mut self, item_id: impl Into<String>, quantity: u32) -> Self {
        self.quantities.insert(item_id.into(), quantity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSplit {
    pub shares: Vec<PayerShare>,
    /// Value of the quantities nobody took
    pub unassigned: f64,
}

/// Split by assigning item quantities to payers
///
/// The quantity assigned across all payers may not exceed what was ordered
/// for any item.
pub fn split_by_items(items: &[SplitItem], assignments: &[PayerAssignment]) -> AppResult<ItemSplit> {
    for assignment in assignments {
        if let Some(unknown) = assignment
            .quantities
            .keys()
            .find(|id| !items.iter().any(|item| &item.id == *id))
        {
            return Err(AppError::not_found(format!("Item {unknown}")));
        }
    }

    let mut prices = HashMap::with_capacity(items.len());
    let mut unassigned = Decimal::ZERO;
    for (i, item) in items.iter().enumerate() {
        let price = check_amount(item.price, &format!("items[{i}].price"))?;
        prices.insert(item.id.as_str(), price);

        let assigned: u64 = assignments
            .iter()
            .map(|a| u64::from(a.quantities.get(&item.id).copied().unwrap_or(0)))
            .sum();
        if assigned > u64::from(item.quantity) {
            return Err(AppError::with_message(
                ErrorCode::SplitExceedsQuantity,
                format!(
                    "'{}' assigned {} times but ordered {}",
                    item.title, assigned, item.quantity
                ),
            )
            .with_detail("item_id", item.id.clone()));
        }
        // assigned <= quantity, so this fits in u32
        let left = item.quantity - assigned as u32;
        unassigned = add_line(unassigned, price, left, "unassigned")?;
    }

    let mut shares = Vec::with_capacity(assignments.len());
    for a in assignments {
        let mut sum = Decimal::ZERO;
        for item in items {
            let qty = a.quantities.get(&item.id).copied().unwrap_or(0);
            let price = prices.get(item.id.as_str()).copied().unwrap_or_default();
            sum = add_line(sum, price, qty, &a.payer)?;
        }
        shares.push(PayerShare {
            name: a.payer.clone(),
            amount: to_f64(sum),
        });
    }

    Ok(ItemSplit {
        shares,
        unassigned: to_f64(unassigned),
    })
}
