//! Validation and totals for requested item lists.

use tillbook_shared::types::Cents;

use super::error::TradeValidationError;
use super::types::TradeItemInput;

/// Validates a requested item list.
///
/// # Errors
///
/// Returns the first [`TradeValidationError`] encountered, with the item
/// index where applicable.
pub fn validate_items(items: &[TradeItemInput]) -> Result<(), TradeValidationError> {
    if items.is_empty() {
        return Err(TradeValidationError::EmptyItems);
    }
    for (index, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            return Err(TradeValidationError::NonPositiveQuantity {
                index,
                quantity: item.quantity,
            });
        }
        if item.unit_amount_cents < 0 {
            return Err(TradeValidationError::NegativeUnitAmount {
                index,
                amount: item.unit_amount_cents,
            });
        }
        if item.subtotal_cents < 0 {
            return Err(TradeValidationError::NegativeSubtotal {
                index,
                amount: item.subtotal_cents,
            });
        }
    }
    Ok(())
}

/// Computes the header total as the checked sum of line subtotals.
///
/// The total is always computed server-side from the submitted subtotals;
/// a client-supplied header total is never trusted.
///
/// # Errors
///
/// Returns [`TradeValidationError::TotalOverflow`] when the sum leaves
/// the `i64` range.
pub fn items_total(items: &[TradeItemInput]) -> Result<Cents, TradeValidationError> {
    items
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.subtotal_cents))
        .ok_or(TradeValidationError::TotalOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillbook_shared::types::ShopProductId;

    fn item(quantity: i64, unit_amount_cents: Cents, subtotal_cents: Cents) -> TradeItemInput {
        TradeItemInput {
            shop_product_id: ShopProductId::new(),
            quantity,
            unit_amount_cents,
            subtotal_cents,
            tax_included: false,
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        assert_eq!(validate_items(&[]), Err(TradeValidationError::EmptyItems));
    }

    #[test]
    fn test_valid_items_pass() {
        let items = [item(10, 500, 5000), item(3, 2000, 6000)];
        assert!(validate_items(&items).is_ok());
        assert_eq!(items_total(&items), Ok(11000));
    }

    #[test]
    fn test_non_positive_quantity_rejected_with_index() {
        let items = [item(10, 500, 5000), item(0, 2000, 0)];
        assert_eq!(
            validate_items(&items),
            Err(TradeValidationError::NonPositiveQuantity {
                index: 1,
                quantity: 0,
            })
        );
    }

    #[test]
    fn test_negative_unit_amount_rejected() {
        let items = [item(1, -5, 0)];
        assert_eq!(
            validate_items(&items),
            Err(TradeValidationError::NegativeUnitAmount {
                index: 0,
                amount: -5,
            })
        );
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        let items = [item(1, 5, -5)];
        assert_eq!(
            validate_items(&items),
            Err(TradeValidationError::NegativeSubtotal {
                index: 0,
                amount: -5,
            })
        );
    }

    #[test]
    fn test_subtotal_is_not_cross_checked_against_unit_amount() {
        // A discounted line: subtotal lower than quantity x unit amount.
        let items = [item(10, 500, 4500)];
        assert!(validate_items(&items).is_ok());
        assert_eq!(items_total(&items), Ok(4500));
    }

    #[test]
    fn test_total_overflow() {
        let items = [item(1, 0, i64::MAX), item(1, 0, 1)];
        assert_eq!(items_total(&items), Err(TradeValidationError::TotalOverflow));
    }
}
