//! Input validation for session operations.

use tillbook_shared::types::Cents;

use super::error::RegisterError;

/// Validates the opening amount of a new session.
///
/// # Errors
///
/// Returns [`RegisterError::NegativeOpeningAmount`] when negative.
pub const fn validate_opening_amount(amount: Cents) -> Result<(), RegisterError> {
    if amount < 0 {
        Err(RegisterError::NegativeOpeningAmount { amount })
    } else {
        Ok(())
    }
}

/// Validates the magnitude of a cash movement.
///
/// # Errors
///
/// Returns [`RegisterError::NonPositiveAmount`] unless strictly positive.
pub const fn validate_movement_amount(amount: Cents) -> Result<(), RegisterError> {
    if amount <= 0 {
        Err(RegisterError::NonPositiveAmount { amount })
    } else {
        Ok(())
    }
}

/// Validates the physically counted closing amount.
///
/// # Errors
///
/// Returns [`RegisterError::NegativeCountedAmount`] when negative.
pub const fn validate_counted_amount(amount: Cents) -> Result<(), RegisterError> {
    if amount < 0 {
        Err(RegisterError::NegativeCountedAmount { amount })
    } else {
        Ok(())
    }
}
