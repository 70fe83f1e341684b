//! Property-based tests for the reconciliation fold.

use proptest::prelude::*;
use tillbook_shared::types::Cents;

use super::reconcile::{MovementAmount, reconcile_movements};
use super::types::{CashMovementKind, DifferenceStatus};

fn kind_strategy() -> impl Strategy<Value = CashMovementKind> {
    prop_oneof![
        Just(CashMovementKind::Sale),
        Just(CashMovementKind::Purchase),
        Just(CashMovementKind::Income),
        Just(CashMovementKind::Expense),
        Just(CashMovementKind::Return),
        Just(CashMovementKind::Withdrawal),
        Just(CashMovementKind::Deposit),
    ]
}

fn movement_strategy() -> impl Strategy<Value = MovementAmount> {
    (kind_strategy(), 1i64..1_000_000i64).prop_map(|(kind, amount_cents)| MovementAmount {
        kind,
        amount_cents,
    })
}

fn movements_strategy() -> impl Strategy<Value = Vec<MovementAmount>> {
    prop::collection::vec(movement_strategy(), 0..64)
}

proptest! {
    #[test]
    fn prop_reconcile_is_deterministic(
        opening in 0i64..10_000_000i64,
        movements in movements_strategy(),
    ) {
        let first = reconcile_movements(opening, &movements).unwrap();
        let second = reconcile_movements(opening, &movements).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_expected_is_opening_plus_signed_sum(
        opening in 0i64..10_000_000i64,
        movements in movements_strategy(),
    ) {
        let totals = reconcile_movements(opening, &movements).unwrap();

        let signed: Cents = movements
            .iter()
            .map(|m| if m.kind.is_inflow() { m.amount_cents } else { -m.amount_cents })
            .sum();
        prop_assert_eq!(totals.signed_total_cents, signed);
        prop_assert_eq!(totals.expected_cents, opening + signed);
    }

    #[test]
    fn prop_signed_total_agrees_with_income_minus_expense(
        opening in 0i64..10_000_000i64,
        movements in movements_strategy(),
    ) {
        let totals = reconcile_movements(opening, &movements).unwrap();
        prop_assert_eq!(
            totals.signed_total_cents,
            totals.total_income_cents - totals.total_expense_cents
        );
        prop_assert_eq!(totals.net_income_cents, totals.signed_total_cents);
    }

    #[test]
    fn prop_buckets_partition_the_movements(
        opening in 0i64..10_000_000i64,
        movements in movements_strategy(),
    ) {
        let totals = reconcile_movements(opening, &movements).unwrap();
        let magnitude_sum: Cents = movements.iter().map(|m| m.amount_cents).sum();
        let bucket_sum = totals.sales_cents
            + totals.purchases_cents
            + totals.incomes_cents
            + totals.expenses_cents
            + totals.returns_cents
            + totals.withdrawals_cents
            + totals.deposits_cents;
        prop_assert_eq!(bucket_sum, magnitude_sum);
    }

    #[test]
    fn prop_classification_matches_difference_sign(
        counted in 0i64..10_000_000i64,
        expected in 0i64..10_000_000i64,
    ) {
        let difference = counted - expected;
        let status = DifferenceStatus::classify(difference);
        match difference.signum() {
            0 => prop_assert_eq!(status, DifferenceStatus::Exact),
            1 => prop_assert_eq!(status, DifferenceStatus::Surplus),
            _ => prop_assert_eq!(status, DifferenceStatus::Shortage),
        }
    }
}
