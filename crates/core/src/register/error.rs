//! Error types for register session logic.

use thiserror::Error;
use tillbook_shared::types::Cents;

/// Errors from register session validation and arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// Movement amounts are positive magnitudes; the sign comes from the
    /// kind.
    #[error("movement amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The rejected amount.
        amount: Cents,
    },

    /// An opening amount cannot be negative.
    #[error("opening amount must not be negative, got {amount}")]
    NegativeOpeningAmount {
        /// The rejected amount.
        amount: Cents,
    },

    /// A counted closing amount cannot be negative.
    #[error("counted amount must not be negative, got {amount}")]
    NegativeCountedAmount {
        /// The rejected amount.
        amount: Cents,
    },

    /// A running total left the `i64` range.
    #[error("session totals overflowed")]
    AmountOverflow,
}
