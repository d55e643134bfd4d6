//! Shared types for the table booking workspace
//!
//! Plain data types used by the booking engine and by any front end that
//! renders its state: dining tables and their layout records, the food
//! catalog, people and their order lines, bookings, order history, the
//! typed checkout draft order, and the unified error codes.

pub mod checkout;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
