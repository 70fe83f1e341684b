//! Stock change types and delta arithmetic.
//!
//! The persistence layer owns the actual read-modify-write against
//! `shop_products`; this module owns the rules it applies: which change
//! types exist, how a delta moves a quantity, when a cost is overwritten,
//! and when a change crosses the low-stock threshold.

pub mod change;
pub mod types;

#[cfg(test)]
mod change_props;

pub use change::{StockChangeError, apply_delta, crosses_low_stock};
pub use types::{LowStockAlert, StockChangeType};
