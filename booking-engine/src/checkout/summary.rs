//! Draft order totals

use crate::money::{to_decimal, to_f64};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use shared::checkout::{DraftLineItem, DraftOrder, TaxLine, parse_amount};
use shared::models::OrderHistoryEntry;
use shared::{AppError, AppResult, ErrorCode};

/// Computed totals of a draft order (结账汇总)
///
/// `subtotal = line_items_total - discount` (never below zero) and
/// `total = subtotal + tax + shipping`, with tax left out of the sum when
/// the draft says prices already include it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub currency: String,
    pub item_count: i64,
    pub line_items_total: f64,
    pub discount: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
}

impl CheckoutSummary {
    pub fn from_draft(order: &DraftOrder) -> AppResult<Self> {
        order.validate()?;

        let mut item_count: i64 = 0;
        let mut line_items_total = Decimal::ZERO;
        let mut line_tax = Decimal::ZERO;
        for (i, item) in order.line_items.iter().enumerate() {
            let field = format!("line_items[{i}].price");
            let price = amount(&item.price, &field)?;
            let line = price
                .checked_mul(Decimal::from(item.quantity))
                .ok_or_else(|| overflow(&field))?;
            line_items_total = checked_add(line_items_total, line, "line_items")?;
            line_tax = checked_add(line_tax, sum_tax_lines(&item.tax_lines)?, "tax_lines")?;
            item_count = item_count
                .checked_add(item.quantity)
                .ok_or_else(|| overflow(&format!("line_items[{i}].quantity")))?;
        }

        // Order-level tax lines already aggregate the per-line ones
        let tax = if order.tax_lines.is_empty() {
            line_tax
        } else {
            sum_tax_lines(&order.tax_lines)?
        };

        let discount = match &order.applied_discount {
            Some(d) => amount(&d.amount, "applied_discount.amount")?,
            None => Decimal::ZERO,
        };
        let shipping = match &order.shipping_line {
            Some(s) => amount(&s.price, "shipping_line.price")?,
            None => Decimal::ZERO,
        };

        let subtotal = (line_items_total - discount).max(Decimal::ZERO);
        let mut total = checked_add(subtotal, shipping, "total")?;
        if !order.taxes_included {
            total = checked_add(total, tax, "total")?;
        }

        Ok(Self {
            currency: order.currency().to_string(),
            item_count,
            line_items_total: to_f64(line_items_total),
            discount: to_f64(discount),
            subtotal: to_f64(subtotal),
            tax: to_f64(tax),
            shipping: to_f64(shipping),
            total: to_f64(total),
        })
    }
}

/// Parse a money string straight into `Decimal`; unrepresentable values are errors, never zero
fn amount(raw: &str, field: &str) -> AppResult<Decimal> {
    let value = parse_amount(raw, field)?;
    Decimal::from_f64(value).ok_or_else(|| overflow(field))
}

fn checked_add(a: Decimal, b: Decimal, field: &str) -> AppResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(field))
}

fn overflow(field: &str) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidAmount,
        format!("Amount out of range in {field}"),
    )
    .with_detail("field", field)
}

fn sum_tax_lines(lines: &[TaxLine]) -> AppResult<Decimal> {
    let mut sum = Decimal::ZERO;
    for (j, tax) in lines.iter().enumerate() {
        let field = format!("tax_lines[{j}].price");
        sum = checked_add(sum, amount(&tax.price, &field)?, &field)?;
    }
    Ok(sum)
}

/// Build a draft order from a recorded history entry
///
/// Items with the same name and unit price collapse into one line item.
pub fn draft_from_history(entry: &OrderHistoryEntry, currency: &str) -> DraftOrder {
    let mut line_items: Vec<(String, Decimal, i64)> = Vec::new();
    for item in &entry.items {
        let quantity = item.quantity.max(1);
        let unit = to_decimal(item.price) / Decimal::from(quantity);
        match line_items
            .iter_mut()
            .find(|(name, price, _)| *name == item.name && *price == unit)
        {
            Some((_, _, qty)) => *qty += i64::from(quantity),
            None => line_items.push((item.name.clone(), unit, i64::from(quantity))),
        }
    }

    DraftOrder {
        id: None,
        name: Some(format!("#{}", entry.table_number)),
        email: None,
        status: Some("open".to_string()),
        currency: currency.to_string(),
        presentment_currency: None,
        created_at: None,
        taxes_included: false,
        line_items: line_items
            .into_iter()
            .map(|(title, unit, quantity)| DraftLineItem {
                id: None,
                title,
                quantity,
                price: format!("{:.2}", to_f64(unit)),
                taxable: false,
                tax_lines: Vec::new(),
            })
            .collect(),
        applied_discount: None,
        shipping_line: None,
        tax_lines: Vec::new(),
    }
}
