//! Cash-register session logic.
//!
//! This module implements the money side of a register shift:
//! - Cash movement kinds and their signs
//! - The reconciliation fold (opening → expected amount)
//! - Difference classification (exact / surplus / shortage)
//! - Closing-mode inference from free-text closing notes
//! - Input validation for opening, appending, and closing

pub mod error;
pub mod reconcile;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reconcile_props;

pub use error::RegisterError;
pub use reconcile::{MovementAmount, ReconciliationTotals, infer_closing_mode, reconcile_movements};
pub use types::{CashMovementKind, ClosingMode, DifferenceStatus, SessionStatus};
pub use validation::{validate_counted_amount, validate_movement_amount, validate_opening_amount};
