//! Data models
//!
//! Shared between the booking engine and whatever renders it. Persisted
//! snapshots use camelCase field names so the stored JSON keeps the same
//! shape as the browser storage layout it replaces.

pub mod booking;
pub mod dining_table;
pub mod food;
pub mod order_history;
pub mod order_line;
pub mod person;

// Re-exports
pub use booking::*;
pub use dining_table::*;
pub use food::*;
pub use order_history::*;
pub use order_line::*;
pub use person::*;
