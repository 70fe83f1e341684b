//! The reconciliation fold and closing-mode inference.
//!
//! Reconciliation is a pure function over a session's movements: given the
//! opening amount and every movement in order, it produces per-kind totals,
//! the expected drawer amount, and nothing else. The persistence layer
//! feeds it committed rows; calling it twice on the same rows yields the
//! same result.

use serde::{Deserialize, Serialize};
use tillbook_shared::types::Cents;

use super::error::RegisterError;
use super::types::{CashMovementKind, ClosingMode};

/// One movement as the fold sees it: kind plus positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementAmount {
    /// What kind of event this was.
    pub kind: CashMovementKind,
    /// Positive magnitude in cents.
    pub amount_cents: Cents,
}

/// Totals produced by the reconciliation fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciliationTotals {
    /// Sum of SALE movements.
    pub sales_cents: Cents,
    /// Sum of PURCHASE movements.
    pub purchases_cents: Cents,
    /// Sum of INCOME movements.
    pub incomes_cents: Cents,
    /// Sum of EXPENSE movements.
    pub expenses_cents: Cents,
    /// Sum of RETURN movements.
    pub returns_cents: Cents,
    /// Sum of WITHDRAWAL movements.
    pub withdrawals_cents: Cents,
    /// Sum of DEPOSIT movements.
    pub deposits_cents: Cents,
    /// Cash in: sales + incomes + deposits.
    pub total_income_cents: Cents,
    /// Cash out: purchases + expenses + returns + withdrawals.
    pub total_expense_cents: Cents,
    /// `total_income - total_expense`.
    pub net_income_cents: Cents,
    /// Running total with signs applied per kind; equals net income.
    pub signed_total_cents: Cents,
    /// `opening + signed_total`: what the drawer should hold.
    pub expected_cents: Cents,
}

/// Folds a session's movements into reconciliation totals.
///
/// Signs are derived from the kind: SALE, INCOME, DEPOSIT add to the
/// drawer; PURCHASE, RETURN, EXPENSE, WITHDRAWAL take from it. Magnitudes
/// are assumed positive (enforced when movements are appended).
///
/// # Errors
///
/// Returns [`RegisterError::AmountOverflow`] if any running total leaves
/// the `i64` range.
pub fn reconcile_movements(
    opening_cents: Cents,
    movements: &[MovementAmount],
) -> Result<ReconciliationTotals, RegisterError> {
    let mut totals = ReconciliationTotals::default();

    for movement in movements {
        let amount = movement.amount_cents;
        let bucket = match movement.kind {
            CashMovementKind::Sale => &mut totals.sales_cents,
            CashMovementKind::Purchase => &mut totals.purchases_cents,
            CashMovementKind::Income => &mut totals.incomes_cents,
            CashMovementKind::Expense => &mut totals.expenses_cents,
            CashMovementKind::Return => &mut totals.returns_cents,
            CashMovementKind::Withdrawal => &mut totals.withdrawals_cents,
            CashMovementKind::Deposit => &mut totals.deposits_cents,
        };
        *bucket = checked(bucket.checked_add(amount))?;

        totals.signed_total_cents = if movement.kind.is_inflow() {
            checked(totals.signed_total_cents.checked_add(amount))?
        } else {
            checked(totals.signed_total_cents.checked_sub(amount))?
        };
    }

    totals.total_income_cents = checked(
        totals
            .sales_cents
            .checked_add(totals.incomes_cents)
            .and_then(|v| v.checked_add(totals.deposits_cents)),
    )?;
    totals.total_expense_cents = checked(
        totals
            .purchases_cents
            .checked_add(totals.expenses_cents)
            .and_then(|v| v.checked_add(totals.returns_cents))
            .and_then(|v| v.checked_add(totals.withdrawals_cents)),
    )?;
    totals.net_income_cents = checked(
        totals
            .total_income_cents
            .checked_sub(totals.total_expense_cents),
    )?;
    totals.expected_cents = checked(opening_cents.checked_add(totals.signed_total_cents))?;

    Ok(totals)
}

const fn checked(value: Option<Cents>) -> Result<Cents, RegisterError> {
    match value {
        Some(v) => Ok(v),
        None => Err(RegisterError::AmountOverflow),
    }
}

/// Infers how a session was closed from its free-text closing notes.
///
/// A case- and diacritic-insensitive "automatic" substring marks the
/// session AUTOMATIC; anything else (including absent notes) is MANUAL.
/// This is a heuristic over free text carried over from the existing
/// data model, not a stored flag; changing it would reclassify
/// historical sessions.
#[must_use]
pub fn infer_closing_mode(closing_notes: Option<&str>) -> ClosingMode {
    match closing_notes {
        Some(notes) if normalize_notes(notes).contains("automatic") => ClosingMode::Automatic,
        _ => ClosingMode::Manual,
    }
}

fn normalize_notes(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

/// Maps accented Latin letters onto their base letter. Covers the
/// alphabets this data actually contains (Western European storefronts);
/// unknown characters pass through unchanged.
const fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' => 'u',
        'ç' | 'ć' | 'ĉ' | 'č' => 'c',
        'ñ' | 'ń' | 'ň' => 'n',
        'ý' | 'ÿ' => 'y',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        _ => c,
    }
}
