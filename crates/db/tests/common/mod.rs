//! Shared harness for the hermetic integration suite.
//!
//! Every test gets its own in-memory SQLite database, migrated from
//! scratch and seeded with a small fixed world: an owner, a member
//! employee, an outsider, one shop with two stocked products, and a
//! supplier per owner. The pool is pinned to a single connection so the
//! in-memory database is shared across queries.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use tillbook_core::stock::LowStockAlert;
use tillbook_core::tenancy::Actor;
use tillbook_core::trade::TradeItemInput;
use tillbook_db::entities::sea_orm_active_enums::UserRole;
use tillbook_db::entities::{products, shop_members, shop_products, shops, suppliers, users};
use tillbook_db::migration::Migrator;
use tillbook_db::notify::{LowStockNotifier, NotifyError};
use tillbook_shared::types::{Cents, ShopId, ShopProductId, SupplierId, UserId};

/// Fixed world every test starts from.
pub struct TestWorld {
    pub db: DatabaseConnection,
    /// Owns the shop directly.
    pub owner: Actor,
    /// Employee assigned to the shop.
    pub employee: Actor,
    /// Employee of nobody; member of nothing.
    pub outsider: Actor,
    pub shop_id: ShopId,
    /// Supplier owned by `owner`.
    pub supplier_id: SupplierId,
    /// Supplier owned by `outsider`.
    pub foreign_supplier_id: SupplierId,
    /// Starts at quantity 0, cost 0, low-stock threshold 5.
    pub widget: ShopProductId,
    /// Starts at quantity 20, cost 1200, low-stock threshold 3.
    pub gadget: ShopProductId,
}

/// Connects a fresh in-memory database and runs all migrations.
pub async fn fresh_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // One connection, or each pooled connection would see its own
    // empty in-memory database.
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None).await.expect("migrations failed");
    db
}

/// Builds the fixed world on a fresh database.
pub async fn setup() -> TestWorld {
    let db = fresh_db().await;

    let owner_id = insert_user(&db, "owner@till.test", "Olive Owner", UserRole::Owner).await;
    let employee_id = insert_user(&db, "clerk@till.test", "Casey Clerk", UserRole::Employee).await;
    let outsider_id = insert_user(&db, "other@till.test", "Sam Stranger", UserRole::Employee).await;

    let shop_id = insert_shop(&db, "Corner Store", owner_id).await;
    insert_member(&db, shop_id, employee_id).await;

    let supplier_id = insert_supplier(&db, "Acme Wholesale", owner_id).await;
    let foreign_supplier_id = insert_supplier(&db, "Someone Else's", outsider_id).await;

    let widget = insert_shop_product(&db, shop_id, "Widget", 0, 0, 5).await;
    let gadget = insert_shop_product(&db, shop_id, "Gadget", 20, 1200, 3).await;

    TestWorld {
        db,
        owner: Actor::owner(owner_id, None),
        employee: Actor::employee(employee_id),
        outsider: Actor::employee(outsider_id),
        shop_id,
        supplier_id,
        foreign_supplier_id,
        widget,
        gadget,
    }
}

pub async fn insert_user(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    role: UserRole,
) -> UserId {
    let id = UserId::new();
    let now = Utc::now();
    users::ActiveModel {
        id: Set(id.into_inner()),
        email: Set(email.to_owned()),
        full_name: Set(full_name.to_owned()),
        role: Set(role),
        project_id: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert user");
    id
}

pub async fn insert_shop(db: &DatabaseConnection, name: &str, owner_id: UserId) -> ShopId {
    let id = ShopId::new();
    let now = Utc::now();
    shops::ActiveModel {
        id: Set(id.into_inner()),
        name: Set(name.to_owned()),
        owner_id: Set(owner_id.into_inner()),
        project_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert shop");
    id
}

pub async fn insert_member(db: &DatabaseConnection, shop_id: ShopId, user_id: UserId) {
    shop_members::ActiveModel {
        id: Set(Uuid::now_v7()),
        shop_id: Set(shop_id.into_inner()),
        user_id: Set(user_id.into_inner()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert shop member");
}

pub async fn insert_supplier(db: &DatabaseConnection, name: &str, owner_id: UserId) -> SupplierId {
    let id = SupplierId::new();
    let now = Utc::now();
    suppliers::ActiveModel {
        id: Set(id.into_inner()),
        name: Set(name.to_owned()),
        owner_id: Set(owner_id.into_inner()),
        phone: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert supplier");
    id
}

/// Inserts a catalog product and its shop-level stock row in one go.
pub async fn insert_shop_product(
    db: &DatabaseConnection,
    shop_id: ShopId,
    name: &str,
    quantity: i64,
    cost_cents: Cents,
    threshold: i64,
) -> ShopProductId {
    let now = Utc::now();
    let product_id = Uuid::now_v7();
    products::ActiveModel {
        id: Set(product_id),
        name: Set(name.to_owned()),
        barcode: Set(Some(format!("bar-{name}"))),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert product");

    let id = ShopProductId::new();
    shop_products::ActiveModel {
        id: Set(id.into_inner()),
        shop_id: Set(shop_id.into_inner()),
        product_id: Set(product_id),
        quantity_on_hand: Set(quantity),
        cost_price_cents: Set(cost_cents),
        low_stock_threshold: Set(threshold),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert shop product");
    id
}

/// One requested line item with `subtotal = quantity × unit`.
pub fn line(shop_product_id: ShopProductId, quantity: i64, unit_amount_cents: Cents) -> TradeItemInput {
    TradeItemInput {
        shop_product_id,
        quantity,
        unit_amount_cents,
        subtotal_cents: quantity * unit_amount_cents,
        tax_included: false,
    }
}

/// Notifier that records every alert it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<LowStockAlert>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<LowStockAlert> {
        self.alerts.lock().expect("alerts lock").clone()
    }
}

#[async_trait::async_trait]
impl LowStockNotifier for RecordingNotifier {
    async fn notify_low_stock(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        self.alerts.lock().expect("alerts lock").push(alert.clone());
        Ok(())
    }
}

/// Notifier that always fails delivery.
pub struct FailingNotifier;

#[async_trait::async_trait]
impl LowStockNotifier for FailingNotifier {
    async fn notify_low_stock(&self, _alert: &LowStockAlert) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("sink unreachable".into()))
    }
}

/// A recording notifier plus the trait-object handle repositories take.
pub fn recording_notifier() -> (Arc<RecordingNotifier>, Arc<dyn LowStockNotifier>) {
    let recorder = Arc::new(RecordingNotifier::default());
    let handle: Arc<dyn LowStockNotifier> = recorder.clone();
    (recorder, handle)
}
