//! Database seeder for Tillbook development and testing.
//!
//! Seeds a demo world (owner, employee, one shop with stocked products,
//! a supplier) and then runs a day of trading through the real
//! repositories: open the till, book a restock purchase, ring up a
//! sale, and close the till. The resulting rows exercise every write
//! path end to end.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use uuid::Uuid;

use tillbook_core::tenancy::Actor;
use tillbook_core::trade::TradeItemInput;
use tillbook_db::entities::{
    products, sea_orm_active_enums::UserRole, shop_members, shop_products, shops, suppliers, users,
};
use tillbook_db::repositories::{
    CloseSessionInput, CreatePurchaseInput, CreateSaleInput, OpenSessionInput, PurchaseRepository,
    SaleRepository, SessionRepository,
};
use tillbook_db::{LowStockNotifier, notifier_from_config};
use tillbook_shared::config::NotificationConfig;
use tillbook_shared::types::{ShopId, ShopProductId, SupplierId, UserId};

/// Demo owner ID (consistent for all seeds)
const DEMO_OWNER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo employee ID (consistent for all seeds)
const DEMO_EMPLOYEE_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo shop ID (consistent for all seeds)
const DEMO_SHOP_ID: &str = "00000000-0000-0000-0000-000000000010";
/// Demo supplier ID (consistent for all seeds)
const DEMO_SUPPLIER_ID: &str = "00000000-0000-0000-0000-000000000020";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    info!("connecting to database");
    let db = tillbook_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let owner_id = UserId::from_uuid(Uuid::parse_str(DEMO_OWNER_ID)?);
    if users::Entity::find_by_id(owner_id.into_inner())
        .one(&db)
        .await?
        .is_some()
    {
        info!("demo world already seeded, nothing to do");
        return Ok(());
    }

    let employee_id = UserId::from_uuid(Uuid::parse_str(DEMO_EMPLOYEE_ID)?);
    let shop_id = ShopId::from_uuid(Uuid::parse_str(DEMO_SHOP_ID)?);
    let supplier_id = SupplierId::from_uuid(Uuid::parse_str(DEMO_SUPPLIER_ID)?);

    info!("seeding demo world");
    seed_users(&db, owner_id, employee_id).await?;
    seed_shop(&db, shop_id, owner_id, employee_id).await?;
    seed_supplier(&db, supplier_id, owner_id).await?;
    let coffee = seed_shop_product(&db, shop_id, "House Coffee 250g", 8).await?;
    let tea = seed_shop_product(&db, shop_id, "Loose Leaf Tea 100g", 30).await?;

    info!("running a demo trading day");
    run_trading_day(&db, owner_id, employee_id, shop_id, supplier_id, coffee, tea).await?;

    info!("seeding complete");
    Ok(())
}

async fn seed_users(db: &DatabaseConnection, owner_id: UserId, employee_id: UserId) -> Result<()> {
    let now = Utc::now();
    users::ActiveModel {
        id: Set(owner_id.into_inner()),
        email: Set("owner@tillbook.dev".to_string()),
        full_name: Set("Demo Owner".to_string()),
        role: Set(UserRole::Owner),
        project_id: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    users::ActiveModel {
        id: Set(employee_id.into_inner()),
        email: Set("clerk@tillbook.dev".to_string()),
        full_name: Set("Demo Clerk".to_string()),
        role: Set(UserRole::Employee),
        project_id: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn seed_shop(
    db: &DatabaseConnection,
    shop_id: ShopId,
    owner_id: UserId,
    employee_id: UserId,
) -> Result<()> {
    let now = Utc::now();
    shops::ActiveModel {
        id: Set(shop_id.into_inner()),
        name: Set("Demo Corner Store".to_string()),
        owner_id: Set(owner_id.into_inner()),
        project_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    shop_members::ActiveModel {
        id: Set(Uuid::now_v7()),
        shop_id: Set(shop_id.into_inner()),
        user_id: Set(employee_id.into_inner()),
        created_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn seed_supplier(
    db: &DatabaseConnection,
    supplier_id: SupplierId,
    owner_id: UserId,
) -> Result<()> {
    let now = Utc::now();
    suppliers::ActiveModel {
        id: Set(supplier_id.into_inner()),
        name: Set("Demo Wholesale Ltd".to_string()),
        owner_id: Set(owner_id.into_inner()),
        phone: Set(Some("+1 555 0100".to_string())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn seed_shop_product(
    db: &DatabaseConnection,
    shop_id: ShopId,
    name: &str,
    threshold: i64,
) -> Result<ShopProductId> {
    let now = Utc::now();
    let product_id = Uuid::now_v7();
    products::ActiveModel {
        id: Set(product_id),
        name: Set(name.to_string()),
        barcode: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    let id = ShopProductId::new();
    shop_products::ActiveModel {
        id: Set(id.into_inner()),
        shop_id: Set(shop_id.into_inner()),
        product_id: Set(product_id),
        quantity_on_hand: Set(0),
        cost_price_cents: Set(0),
        low_stock_threshold: Set(threshold),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(id)
}

/// One demo shift through the real repositories: open, restock, sell,
/// close.
async fn run_trading_day(
    db: &DatabaseConnection,
    owner_id: UserId,
    employee_id: UserId,
    shop_id: ShopId,
    supplier_id: SupplierId,
    coffee: ShopProductId,
    tea: ShopProductId,
) -> Result<()> {
    let owner = Actor::owner(owner_id, None);
    let employee = Actor::employee(employee_id);
    let notifier: Arc<dyn LowStockNotifier> = notifier_from_config(&NotificationConfig::default());

    let sessions = SessionRepository::new(db.clone());
    let session = sessions
        .open_session(
            &owner,
            OpenSessionInput {
                shop_id,
                opening_cents: 150_00,
            },
        )
        .await?;
    info!(session_id = %session.id, "till opened");

    let purchase = PurchaseRepository::new(db.clone(), notifier.clone())
        .create_purchase(
            &owner,
            CreatePurchaseInput {
                shop_id,
                supplier_id: Some(supplier_id),
                notes: Some("opening restock".to_string()),
                items: vec![
                    demo_line(coffee, 10, 6_50),
                    demo_line(tea, 10, 3_20),
                ],
            },
        )
        .await?;
    info!(purchase_id = %purchase.purchase.id, total_cents = purchase.purchase.total_cents, "restock booked");

    let sale = SaleRepository::new(db.clone(), notifier)
        .create_sale(
            &employee,
            CreateSaleInput {
                shop_id,
                notes: None,
                items: vec![demo_line(coffee, 2, 12_00), demo_line(tea, 1, 6_00)],
            },
        )
        .await?;
    info!(sale_id = %sale.sale.id, total_cents = sale.sale.total_cents, "sale rung up");

    // Counted two euros short on purpose so the demo reconciliation has
    // something to show.
    let outcome = sessions
        .close_session(
            &owner,
            CloseSessionInput {
                session_id: session.id.into(),
                counted_cents: 150_00 + sale.sale.total_cents
                    - purchase.purchase.total_cents
                    - 2_00,
                closing_notes: Some("manual close after evening count".to_string()),
            },
        )
        .await?;
    info!(
        expected_cents = outcome.totals.expected_cents,
        difference_cents = outcome.difference_cents,
        "till closed"
    );
    Ok(())
}

fn demo_line(shop_product_id: ShopProductId, quantity: i64, unit_amount_cents: i64) -> TradeItemInput {
    TradeItemInput {
        shop_product_id,
        quantity,
        unit_amount_cents,
        subtotal_cents: quantity * unit_amount_cents,
        tax_included: false,
    }
}
