//! Error types for trade document validation.

use thiserror::Error;
use tillbook_shared::types::Cents;

/// Rejections of a requested item list. All of these fire before any
/// write begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TradeValidationError {
    /// A document needs at least one line item.
    #[error("item list must not be empty")]
    EmptyItems,

    /// Quantities are strictly positive.
    #[error("item {index}: quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// Zero-based index into the requested items.
        index: usize,
        /// The rejected quantity.
        quantity: i64,
    },

    /// Unit amounts cannot be negative.
    #[error("item {index}: unit amount must not be negative, got {amount}")]
    NegativeUnitAmount {
        /// Zero-based index into the requested items.
        index: usize,
        /// The rejected amount.
        amount: Cents,
    },

    /// Subtotals cannot be negative.
    #[error("item {index}: subtotal must not be negative, got {amount}")]
    NegativeSubtotal {
        /// Zero-based index into the requested items.
        index: usize,
        /// The rejected amount.
        amount: Cents,
    },

    /// The header total left the `i64` range.
    #[error("document total overflowed")]
    TotalOverflow,
}
