//! Property-based tests for trade item validation.

use proptest::prelude::*;
use tillbook_shared::types::ShopProductId;

use super::types::TradeItemInput;
use super::validation::{items_total, validate_items};

fn valid_item_strategy() -> impl Strategy<Value = TradeItemInput> {
    (1i64..10_000i64, 0i64..1_000_000i64, 0i64..10_000_000i64, any::<bool>()).prop_map(
        |(quantity, unit_amount_cents, subtotal_cents, tax_included)| TradeItemInput {
            shop_product_id: ShopProductId::new(),
            quantity,
            unit_amount_cents,
            subtotal_cents,
            tax_included,
        },
    )
}

proptest! {
    #[test]
    fn prop_valid_items_always_pass(
        items in prop::collection::vec(valid_item_strategy(), 1..32),
    ) {
        prop_assert!(validate_items(&items).is_ok());
    }

    #[test]
    fn prop_total_is_sum_of_subtotals(
        items in prop::collection::vec(valid_item_strategy(), 1..32),
    ) {
        let expected: i64 = items.iter().map(|i| i.subtotal_cents).sum();
        prop_assert_eq!(items_total(&items), Ok(expected));
    }

    #[test]
    fn prop_any_bad_quantity_is_rejected(
        mut items in prop::collection::vec(valid_item_strategy(), 1..32),
        bad_index in any::<prop::sample::Index>(),
        bad_quantity in -10_000i64..=0i64,
    ) {
        let index = bad_index.index(items.len());
        items[index].quantity = bad_quantity;
        prop_assert!(validate_items(&items).is_err());
    }
}
