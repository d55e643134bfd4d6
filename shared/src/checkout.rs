//! Checkout draft order schema
//!
//! Typed boundary for the draft-order JSON the checkout screen receives.
//! Money fields arrive as decimal strings (`"20.00"`); they are parsed and
//! checked by [`DraftOrder::validate`] before any total is computed.
//! Unknown fields (addresses, customer, invoice links) are ignored.

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};

/// Largest accepted money value on a draft (1,000,000)
pub const MAX_AMOUNT: f64 = 1_000_000.0;
/// Largest accepted quantity per line item
pub const MAX_QUANTITY: i64 = 9999;

/// Tax line (税项)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub title: String,
    pub price: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountValueType {
    #[default]
    FixedAmount,
    Percentage,
}

/// Discount applied to the whole draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw value: an amount or a percentage depending on `value_type`
    pub value: String,
    /// Resolved discount amount in currency units
    pub amount: String,
    #[serde(default)]
    pub value_type: DiscountValueType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub title: Option<String>,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLineItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    /// Signed so that negative input is rejected by validation, not by the parser
    pub quantity: i64,
    pub price: String,
    #[serde(default)]
    pub taxable: bool,
    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,
}

/// Draft order (草稿订单)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrder {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub presentment_currency: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub taxes_included: bool,
    pub line_items: Vec<DraftLineItem>,
    #[serde(default)]
    pub applied_discount: Option<AppliedDiscount>,
    #[serde(default)]
    pub shipping_line: Option<ShippingLine>,
    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,
}

/// Accepts both `{ "draft_order": { .. } }` and a bare draft order
#[derive(Deserialize)]
#[serde(untagged)]
enum DraftOrderPayload {
    Envelope { draft_order: DraftOrder },
    Bare(DraftOrder),
}

impl DraftOrder {
    /// Parse and validate a draft-order payload
    pub fn from_json(json: &str) -> AppResult<Self> {
        let payload: DraftOrderPayload = serde_json::from_str(json)
            .map_err(|e| AppError::invalid_format(format!("Invalid draft order: {e}")))?;
        let order = match payload {
            DraftOrderPayload::Envelope { draft_order } => draft_order,
            DraftOrderPayload::Bare(order) => order,
        };
        order.validate()?;
        Ok(order)
    }

    /// Currency code, falling back to the presentment currency
    pub fn currency(&self) -> &str {
        if self.currency.trim().is_empty() {
            self.presentment_currency.as_deref().unwrap_or("")
        } else {
            &self.currency
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.currency().trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Draft order has no currency",
            )
            .with_detail("field", "currency"));
        }
        if self.line_items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        for (i, item) in self.line_items.iter().enumerate() {
            if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!(
                        "Line item '{}' quantity {} is outside 1..={}",
                        item.title, item.quantity, MAX_QUANTITY
                    ),
                )
                .with_detail("field", format!("line_items[{i}].quantity")));
            }
            parse_amount(&item.price, &format!("line_items[{i}].price"))?;
            for (j, tax) in item.tax_lines.iter().enumerate() {
                parse_amount(&tax.price, &format!("line_items[{i}].tax_lines[{j}].price"))?;
            }
        }
        for (j, tax) in self.tax_lines.iter().enumerate() {
            parse_amount(&tax.price, &format!("tax_lines[{j}].price"))?;
        }
        if let Some(discount) = &self.applied_discount {
            parse_amount(&discount.amount, "applied_discount.amount")?;
        }
        if let Some(shipping) = &self.shipping_line {
            parse_amount(&shipping.price, "shipping_line.price")?;
        }
        Ok(())
    }
}

/// Parse a money string: finite, not negative, at most [`MAX_AMOUNT`]
pub fn parse_amount(raw: &str, field: &str) -> AppResult<f64> {
    let invalid = || {
        AppError::with_message(ErrorCode::InvalidAmount, format!("Invalid amount '{raw}'"))
            .with_detail("field", field.to_string())
    };
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 || value > MAX_AMOUNT {
        return Err(invalid());
    }
    Ok(value)
}
