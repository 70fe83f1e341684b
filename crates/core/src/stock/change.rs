//! Delta arithmetic for stock changes.

use thiserror::Error;

/// Errors from stock delta arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockChangeError {
    /// Applying the delta would leave the `i64` range.
    #[error("applying delta {delta} to quantity {quantity_before} overflows")]
    QuantityOverflow {
        /// Quantity before the change.
        quantity_before: i64,
        /// The requested signed delta.
        delta: i64,
    },
}

/// Applies a signed delta to a quantity, checking for overflow.
///
/// Negative results are allowed here: the writer is a dumb, auditable
/// mutator. Callers that care (the sale processor) check available stock
/// before invoking it.
///
/// # Errors
///
/// Returns [`StockChangeError::QuantityOverflow`] when the sum leaves the
/// `i64` range.
pub fn apply_delta(quantity_before: i64, delta: i64) -> Result<i64, StockChangeError> {
    quantity_before
        .checked_add(delta)
        .ok_or(StockChangeError::QuantityOverflow {
            quantity_before,
            delta,
        })
}

/// Whether a change moved the quantity from above the threshold to at or
/// below it.
///
/// Alerting on the crossing, not on the state, keeps a product that sits
/// below threshold from re-alerting on every subsequent sale.
#[must_use]
pub const fn crosses_low_stock(before: i64, after: i64, threshold: i64) -> bool {
    before > threshold && after <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_delta_positive() {
        assert_eq!(apply_delta(100, 10), Ok(110));
    }

    #[test]
    fn test_apply_delta_negative_below_zero() {
        // The writer does not reject negative stock; that check belongs to
        // the sale processor.
        assert_eq!(apply_delta(3, -5), Ok(-2));
    }

    #[test]
    fn test_apply_delta_overflow() {
        assert_eq!(
            apply_delta(i64::MAX, 1),
            Err(StockChangeError::QuantityOverflow {
                quantity_before: i64::MAX,
                delta: 1,
            })
        );
        assert_eq!(
            apply_delta(i64::MIN, -1),
            Err(StockChangeError::QuantityOverflow {
                quantity_before: i64::MIN,
                delta: -1,
            })
        );
    }

    #[test]
    fn test_crossing_fires_once() {
        // 12 -> 9 crosses a threshold of 10.
        assert!(crosses_low_stock(12, 9, 10));
        // 9 -> 6 stays below; no new alert.
        assert!(!crosses_low_stock(9, 6, 10));
        // Landing exactly on the threshold counts as low.
        assert!(crosses_low_stock(11, 10, 10));
    }

    #[test]
    fn test_restock_does_not_alert() {
        assert!(!crosses_low_stock(2, 50, 10));
    }

    #[test]
    fn test_zero_threshold_alerts_on_stockout_only() {
        assert!(crosses_low_stock(1, 0, 0));
        assert!(!crosses_low_stock(5, 1, 0));
    }
}
