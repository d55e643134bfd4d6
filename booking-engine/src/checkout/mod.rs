//! Checkout
//!
//! Totals for a validated [`DraftOrder`](shared::checkout::DraftOrder) and
//! the bill split helpers offered on the checkout screen. Nothing here
//! takes a payment.

mod split;
mod summary;

pub use split::{
    CustomSplit, ItemSplit, MAX_PAYERS, MIN_PAYERS, PayerAssignment, PayerShare, SplitItem,
    custom_split, equal_split, split_by_items,
};
pub use summary::{CheckoutSummary, draft_from_history};
