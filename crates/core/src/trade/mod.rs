//! Line-item validation and totals for purchases and sales.
//!
//! A purchase and a sale are structurally the same document: a header plus
//! one-or-more line items against shop-products. Both processors run the
//! same item validation and the same server-side total; only the stock
//! direction and the cash movement kind differ, and those live with the
//! processors.

pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::TradeValidationError;
pub use types::TradeItemInput;
pub use validation::{items_total, validate_items};
