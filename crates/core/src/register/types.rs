//! Domain types for cash-register sessions.

use serde::{Deserialize, Serialize};
use tillbook_shared::types::Cents;

/// Lifecycle state of a register session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting movements.
    Open,
    /// Counted and settled; immutable from here on.
    Closed,
}

impl SessionStatus {
    /// Returns the canonical string form (matches the stored column).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parses a status from its canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// What kind of cash-affecting event a movement records.
///
/// Amounts are stored as positive magnitudes; the sign comes from the
/// kind. The set is closed so the reconciliation fold stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    /// Cash received for a sale.
    Sale,
    /// Cash paid out for a purchase.
    Purchase,
    /// Other cash received (not a sale).
    Income,
    /// Other cash paid out (not a purchase).
    Expense,
    /// Cash refunded to a customer.
    Return,
    /// Cash removed from the drawer.
    Withdrawal,
    /// Cash added to the drawer.
    Deposit,
}

impl CashMovementKind {
    /// Returns the canonical string form (matches the stored column).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Return => "return",
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
        }
    }

    /// Parses a kind from its canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(Self::Sale),
            "purchase" => Some(Self::Purchase),
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "return" => Some(Self::Return),
            "withdrawal" => Some(Self::Withdrawal),
            "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }

    /// Whether this kind adds cash to the drawer.
    ///
    /// Sales, other income, and deposits flow in; purchases, expenses,
    /// customer returns, and withdrawals flow out.
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        matches!(self, Self::Sale | Self::Income | Self::Deposit)
    }
}

impl std::fmt::Display for CashMovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-way classification of counted minus expected.
///
/// Deliberately exact: a one-cent difference is a surplus or shortage,
/// never rounded away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceStatus {
    /// Counted equals expected.
    Exact,
    /// More cash in the drawer than expected.
    Surplus,
    /// Less cash in the drawer than expected.
    Shortage,
}

impl DifferenceStatus {
    /// Classifies a signed difference (counted − expected).
    #[must_use]
    pub const fn classify(difference_cents: Cents) -> Self {
        if difference_cents == 0 {
            Self::Exact
        } else if difference_cents > 0 {
            Self::Surplus
        } else {
            Self::Shortage
        }
    }
}

/// How a session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingMode {
    /// Closed by a person at the register.
    Manual,
    /// Closed by an automated end-of-day process.
    Automatic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_session_status_round_trip() {
        assert_eq!(SessionStatus::parse("open"), Some(SessionStatus::Open));
        assert_eq!(SessionStatus::parse("closed"), Some(SessionStatus::Closed));
        assert_eq!(SessionStatus::parse("OPEN"), None);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            CashMovementKind::Sale,
            CashMovementKind::Purchase,
            CashMovementKind::Income,
            CashMovementKind::Expense,
            CashMovementKind::Return,
            CashMovementKind::Withdrawal,
            CashMovementKind::Deposit,
        ] {
            assert_eq!(CashMovementKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CashMovementKind::parse("transfer"), None);
    }

    #[rstest]
    #[case(CashMovementKind::Sale, true)]
    #[case(CashMovementKind::Income, true)]
    #[case(CashMovementKind::Deposit, true)]
    #[case(CashMovementKind::Purchase, false)]
    #[case(CashMovementKind::Expense, false)]
    #[case(CashMovementKind::Return, false)]
    #[case(CashMovementKind::Withdrawal, false)]
    fn test_flow_direction(#[case] kind: CashMovementKind, #[case] inflow: bool) {
        assert_eq!(kind.is_inflow(), inflow);
    }

    #[rstest]
    #[case(0, DifferenceStatus::Exact)]
    #[case(1, DifferenceStatus::Surplus)]
    #[case(-1, DifferenceStatus::Shortage)]
    #[case(5000, DifferenceStatus::Surplus)]
    #[case(-5000, DifferenceStatus::Shortage)]
    fn test_difference_classification(#[case] diff: Cents, #[case] expected: DifferenceStatus) {
        assert_eq!(DifferenceStatus::classify(diff), expected);
    }
}
