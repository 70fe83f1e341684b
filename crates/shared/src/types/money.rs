//! Integer-cents money helpers.
//!
//! Every monetary amount in the system is an `i64` count of minor currency
//! units ("cents"). There is no decimal or floating-point representation
//! anywhere; the workspace lints deny float arithmetic outright. These
//! helpers centralize the checked arithmetic and display formatting that
//! would otherwise be scattered across repositories.

use thiserror::Error;

/// A monetary amount in minor currency units. Signed: differences and
/// shortages are negative.
pub type Cents = i64;

/// Errors from checked money arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// A sum or product exceeded the `i64` range.
    #[error("amount arithmetic overflowed")]
    Overflow,
}

/// Multiplies a quantity by a unit amount, checking for overflow.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] when the product exceeds `i64`.
pub fn line_total(quantity: i64, unit_cents: Cents) -> Result<Cents, MoneyError> {
    quantity.checked_mul(unit_cents).ok_or(MoneyError::Overflow)
}

/// Sums an iterator of amounts, checking for overflow.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] when the running total exceeds `i64`.
pub fn sum_cents<I>(amounts: I) -> Result<Cents, MoneyError>
where
    I: IntoIterator<Item = Cents>,
{
    amounts
        .into_iter()
        .try_fold(0i64, i64::checked_add)
        .ok_or(MoneyError::Overflow)
}

/// Formats an amount as a human-readable decimal string, e.g. `-12.05`.
///
/// Only used for display (logs, seed output); parsing and arithmetic stay
/// on the integer representation.
#[must_use]
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
