//! Integration tests for the stock ledger writer.
//!
//! Every quantity or cost change must leave exactly one movement row
//! with a consistent before/after chain, and low-stock alerts fire only
//! on a downward threshold crossing, strictly after commit.

mod common;

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tillbook_core::stock::StockChangeType;
use tillbook_db::entities::{shop_products, stock_movements};
use tillbook_db::notifier_from_config;
use tillbook_db::repositories::{ApplyStockChange, StockError, StockLedgerRepository};
use tillbook_shared::config::NotificationConfig;
use tillbook_shared::types::ShopProductId;

use common::{FailingNotifier, recording_notifier, setup};

fn change(
    world: &common::TestWorld,
    shop_product_id: ShopProductId,
    delta: i64,
    change_type: StockChangeType,
    unit_cost_cents: Option<i64>,
) -> ApplyStockChange {
    ApplyStockChange {
        shop_product_id,
        delta,
        actor_id: world.owner.id,
        change_type,
        unit_cost_cents,
        note: None,
        purchase_id: None,
        sale_id: None,
    }
}

#[tokio::test]
async fn test_purchase_in_updates_quantity_and_overwrites_cost() {
    let world = setup().await;
    let (_, notifier) = recording_notifier();
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    let outcome = repo
        .apply_stock_change(change(
            &world,
            world.widget,
            10,
            StockChangeType::PurchaseIn,
            Some(500),
        ))
        .await
        .expect("stock change");

    assert_eq!(outcome.quantity_before, 0);
    assert_eq!(outcome.quantity_after, 10);
    assert_eq!(outcome.cost_before_cents, 0);
    assert_eq!(outcome.cost_after_cents, 500);

    let row = shop_products::Entity::find_by_id(world.widget.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity_on_hand, 10);
    assert_eq!(row.cost_price_cents, 500);
}

#[tokio::test]
async fn test_sale_out_leaves_cost_untouched_and_may_go_negative() {
    let world = setup().await;
    let (_, notifier) = recording_notifier();
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    // The writer never rejects negative resulting stock.
    let outcome = repo
        .apply_stock_change(change(&world, world.widget, -4, StockChangeType::SaleOut, None))
        .await
        .expect("stock change");

    assert_eq!(outcome.quantity_after, -4);
    assert_eq!(outcome.cost_after_cents, 0);
}

#[tokio::test]
async fn test_non_purchase_changes_never_update_cost() {
    let world = setup().await;
    let (_, notifier) = recording_notifier();
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    // Even with a unit cost supplied, an adjustment keeps the old cost.
    let outcome = repo
        .apply_stock_change(change(
            &world,
            world.gadget,
            5,
            StockChangeType::Adjustment,
            Some(9999),
        ))
        .await
        .expect("stock change");

    assert_eq!(outcome.cost_before_cents, 1200);
    assert_eq!(outcome.cost_after_cents, 1200);
}

#[tokio::test]
async fn test_movement_history_chains_before_and_after() {
    let world = setup().await;
    let (_, notifier) = recording_notifier();
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    for (delta, change_type, cost) in [
        (10, StockChangeType::PurchaseIn, Some(500)),
        (-3, StockChangeType::SaleOut, None),
        (-2, StockChangeType::SaleOut, None),
    ] {
        repo.apply_stock_change(change(&world, world.widget, delta, change_type, cost))
            .await
            .expect("stock change");
    }

    let movements = stock_movements::Entity::find()
        .filter(stock_movements::Column::ShopProductId.eq(world.widget.into_inner()))
        .order_by_asc(stock_movements::Column::CreatedAt)
        .order_by_asc(stock_movements::Column::Id)
        .all(&world.db)
        .await
        .unwrap();
    assert_eq!(movements.len(), 3);

    for pair in movements.windows(2) {
        assert_eq!(pair[0].quantity_after, pair[1].quantity_before);
        assert_eq!(pair[0].cost_after_cents, pair[1].cost_before_cents);
    }
    assert_eq!(movements[0].quantity_before, 0);
    assert_eq!(movements[2].quantity_after, 5);
}

#[tokio::test]
async fn test_unknown_shop_product_is_not_found() {
    let world = setup().await;
    let (_, notifier) = recording_notifier();
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    let result = repo
        .apply_stock_change(change(
            &world,
            ShopProductId::new(),
            1,
            StockChangeType::Adjustment,
            None,
        ))
        .await;
    assert!(matches!(result, Err(StockError::NotFound(_))));
}

#[tokio::test]
async fn test_alert_fires_only_when_crossing_the_threshold() {
    let world = setup().await;
    let (recorder, notifier) = recording_notifier();
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    // Gadget: 20 on hand, threshold 3. Down to 4: still above, no alert.
    repo.apply_stock_change(change(&world, world.gadget, -16, StockChangeType::SaleOut, None))
        .await
        .expect("stock change");
    assert!(recorder.alerts().is_empty());

    // 4 -> 3 crosses the threshold.
    repo.apply_stock_change(change(&world, world.gadget, -1, StockChangeType::SaleOut, None))
        .await
        .expect("stock change");
    let alerts = recorder.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].product_name, "Gadget");
    assert_eq!(alerts[0].stock_before, 4);
    assert_eq!(alerts[0].stock_after, 3);
    assert_eq!(alerts[0].owner_id, world.owner.id);

    // Already at or below the threshold: no repeat alert.
    repo.apply_stock_change(change(&world, world.gadget, -1, StockChangeType::SaleOut, None))
        .await
        .expect("stock change");
    assert_eq!(recorder.alerts().len(), 1);
}

#[tokio::test]
async fn test_notifier_failure_never_fails_the_stock_change() {
    let world = setup().await;
    let repo = StockLedgerRepository::new(world.db.clone(), Arc::new(FailingNotifier));

    // Crossing change with a broken sink: the change still commits.
    let outcome = repo
        .apply_stock_change(change(&world, world.gadget, -18, StockChangeType::SaleOut, None))
        .await
        .expect("stock change must survive notifier failure");
    assert_eq!(outcome.quantity_after, 2);

    let row = shop_products::Entity::find_by_id(world.gadget.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity_on_hand, 2);
}

#[tokio::test]
async fn test_disabled_alerts_still_commit_crossing_changes() {
    let world = setup().await;
    let notifier = notifier_from_config(&NotificationConfig {
        low_stock_enabled: false,
    });
    let repo = StockLedgerRepository::new(world.db.clone(), notifier);

    // Crossing change with alerts switched off: dropped silently, the
    // change itself is unaffected.
    let outcome = repo
        .apply_stock_change(change(&world, world.gadget, -18, StockChangeType::SaleOut, None))
        .await
        .expect("stock change");
    assert_eq!(outcome.quantity_after, 2);
}
