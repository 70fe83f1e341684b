//! Integration tests for the deletion audit trail.
//!
//! A purchase delete is snapshot-then-destroy: the audit record is
//! committed before the destructive transaction starts, so a fault in
//! the middle leaves the snapshot durable and the purchase intact.

mod common;

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use tillbook_core::audit::AuditError;
use tillbook_db::entities::sea_orm_active_enums::DeletedEntityKind;
use tillbook_db::entities::{deletion_history, purchase_items, purchases, shop_products, stock_movements};
use tillbook_db::repositories::{
    CreatePurchaseInput, DeletionError, DeletionRepository, OpenSessionInput, PurchaseRepository,
    SessionRepository,
};
use tillbook_shared::types::{PurchaseId, ShopProductId};

use common::{TestWorld, line, recording_notifier, setup};

/// Opens the till and books a two-line purchase: widget 10 x 500 and
/// gadget 3 x 2000, total 11000.
async fn booked_purchase(world: &TestWorld) -> PurchaseId {
    SessionRepository::new(world.db.clone())
        .open_session(
            &world.owner,
            OpenSessionInput {
                shop_id: world.shop_id,
                opening_cents: 200_00,
            },
        )
        .await
        .expect("open session");

    let (_, notifier) = recording_notifier();
    let created = PurchaseRepository::new(world.db.clone(), notifier)
        .create_purchase(
            &world.owner,
            CreatePurchaseInput {
                shop_id: world.shop_id,
                supplier_id: Some(world.supplier_id),
                notes: Some("to be regretted".into()),
                items: vec![line(world.widget, 10, 500), line(world.gadget, 3, 2000)],
            },
        )
        .await
        .expect("create purchase");
    created.purchase.id.into()
}

async fn widget_quantity(world: &TestWorld, id: ShopProductId) -> i64 {
    shop_products::Entity::find_by_id(id.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .unwrap()
        .quantity_on_hand
}

#[tokio::test]
async fn test_short_reason_blocks_the_delete_entirely() {
    let world = setup().await;
    let purchase_id = booked_purchase(&world).await;
    let repo = DeletionRepository::new(world.db.clone());

    // Nine characters after trimming: one short of the minimum.
    let result = repo
        .delete_purchase(&world.owner, purchase_id, "  too brief  ")
        .await;
    assert!(matches!(
        result,
        Err(DeletionError::Reason(AuditError::ReasonTooShort { .. }))
    ));

    assert!(purchases::Entity::find_by_id(purchase_id.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        deletion_history::Entity::find().count(&world.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_delete_preserves_a_denormalized_snapshot() {
    let world = setup().await;
    let purchase_id = booked_purchase(&world).await;
    let repo = DeletionRepository::new(world.db.clone());

    let summary = repo
        .delete_purchase(&world.owner, purchase_id, "duplicate data entry")
        .await
        .expect("delete purchase");

    assert_eq!(summary.purchase_id, purchase_id);
    assert_eq!(summary.deleted_items, 2);
    assert_eq!(summary.deleted_movements, 2);
    assert_eq!(summary.snapshot.shop_name, "Corner Store");
    assert_eq!(summary.snapshot.supplier_name.as_deref(), Some("Acme Wholesale"));
    assert_eq!(summary.snapshot.total_cents, 110_00);
    assert_eq!(summary.snapshot.items.len(), 2);
    assert_eq!(summary.snapshot.items[0].product_name, "Widget");

    // The audit record outlives the purchase.
    let record = deletion_history::Entity::find_by_id(summary.record_id.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .expect("audit record");
    assert_eq!(record.entity_type, DeletedEntityKind::Purchase);
    assert_eq!(record.reason, "duplicate data entry");
    assert_eq!(record.deleted_by, world.owner.id.into_inner());

    // Document rows are gone.
    assert!(purchases::Entity::find_by_id(purchase_id.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        purchase_items::Entity::find().count(&world.db).await.unwrap(),
        0
    );
    assert_eq!(
        stock_movements::Entity::find().count(&world.db).await.unwrap(),
        0
    );

    // Stock received by the purchase is deliberately NOT reversed.
    assert_eq!(widget_quantity(&world, world.widget).await, 10);
    assert_eq!(widget_quantity(&world, world.gadget).await, 23);
}

#[tokio::test]
async fn test_only_the_shop_owner_may_delete() {
    let world = setup().await;
    let purchase_id = booked_purchase(&world).await;
    let repo = DeletionRepository::new(world.db.clone());

    // The employee is a member but not the owner.
    let result = repo
        .delete_purchase(&world.employee, purchase_id, "employee attempting delete")
        .await;
    assert!(matches!(result, Err(DeletionError::Access(_))));
    assert!(purchases::Entity::find_by_id(purchase_id.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_unknown_purchase_is_not_found() {
    let world = setup().await;
    let repo = DeletionRepository::new(world.db.clone());
    let result = repo
        .delete_purchase(&world.owner, PurchaseId::new(), "deleting a ghost record")
        .await;
    assert!(matches!(result, Err(DeletionError::NotFound(_))));
}

#[tokio::test]
async fn test_fault_during_destruction_keeps_snapshot_and_purchase() {
    let world = setup().await;
    let purchase_id = booked_purchase(&world).await;
    let repo = DeletionRepository::new(world.db.clone());

    world
        .db
        .execute_unprepared(
            "CREATE TRIGGER purchase_item_delete_fault
             BEFORE DELETE ON purchase_items
             BEGIN SELECT RAISE(ABORT, 'injected fault'); END;",
        )
        .await
        .expect("install trigger");

    let result = repo
        .delete_purchase(&world.owner, purchase_id, "fault injection run")
        .await;
    assert!(result.is_err());

    // Phase 1 committed: the snapshot survives the failed phase 2.
    assert_eq!(
        deletion_history::Entity::find().count(&world.db).await.unwrap(),
        1
    );
    // Phase 2 rolled back whole: purchase, items, and history rows intact.
    assert!(purchases::Entity::find_by_id(purchase_id.into_inner())
        .one(&world.db)
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        purchase_items::Entity::find().count(&world.db).await.unwrap(),
        2
    );
    assert_eq!(
        stock_movements::Entity::find().count(&world.db).await.unwrap(),
        2
    );
}
