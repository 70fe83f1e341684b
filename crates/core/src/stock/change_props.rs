//! Property-based tests for stock delta arithmetic.
//!
//! The load-bearing property is conservation: replaying any sequence of
//! applied deltas from the initial quantity lands exactly on the final
//! quantity, which is what makes the movement history auditable.

use proptest::prelude::*;

use super::change::apply_delta;

/// Deltas small enough that a sequence of them cannot overflow `i64`.
fn delta_strategy() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000i64
}

proptest! {
    #[test]
    fn prop_conservation_over_delta_sequences(
        initial in -1_000_000i64..1_000_000i64,
        deltas in prop::collection::vec(delta_strategy(), 0..50),
    ) {
        let mut quantity = initial;
        let mut ledger = Vec::with_capacity(deltas.len());
        for delta in &deltas {
            let after = apply_delta(quantity, *delta).unwrap();
            ledger.push((quantity, after));
            quantity = after;
        }

        // Final quantity equals initial plus the sum of recorded deltas.
        let replayed: i64 = ledger.iter().map(|(before, after)| after - before).sum();
        prop_assert_eq!(initial + replayed, quantity);

        // Each record's delta matches what was requested, in order.
        for ((before, after), requested) in ledger.iter().zip(&deltas) {
            prop_assert_eq!(after - before, *requested);
        }
    }

    #[test]
    fn prop_apply_delta_matches_checked_add(
        quantity in any::<i64>(),
        delta in any::<i64>(),
    ) {
        match quantity.checked_add(delta) {
            Some(expected) => prop_assert_eq!(apply_delta(quantity, delta), Ok(expected)),
            None => prop_assert!(apply_delta(quantity, delta).is_err()),
        }
    }
}
