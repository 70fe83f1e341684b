//! Initial database migration.
//!
//! Creates every table of the ledger engine. The DDL sticks to the
//! portable subset shared by PostgreSQL and SQLite: discriminated
//! columns are TEXT with CHECK constraints instead of native enum
//! types, and the application supplies ids and timestamps, so there
//! are no server-side defaults.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: TENANCY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(SHOPS_SQL).await?;
        db.execute_unprepared(SHOP_MEMBERS_SQL).await?;
        db.execute_unprepared(SUPPLIERS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(SHOP_PRODUCTS_SQL).await?;

        // ============================================================
        // PART 3: CASH REGISTER
        // ============================================================
        db.execute_unprepared(REGISTER_SESSIONS_SQL).await?;
        db.execute_unprepared(CASH_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 4: PURCHASES & SALES
        // ============================================================
        db.execute_unprepared(PURCHASES_SQL).await?;
        db.execute_unprepared(PURCHASE_ITEMS_SQL).await?;
        db.execute_unprepared(SALES_SQL).await?;
        db.execute_unprepared(SALE_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: STOCK LEDGER
        // ============================================================
        // Last of the operational tables: its rows reference purchases
        // and sales.
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 6: DELETION AUDIT
        // ============================================================
        db.execute_unprepared(DELETION_HISTORY_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('owner', 'manager', 'employee')),
    project_id UUID,
    is_active BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
";

const SHOPS_SQL: &str = r"
CREATE TABLE shops (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    owner_id UUID NOT NULL REFERENCES users(id),
    project_id UUID,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_shops_owner ON shops(owner_id);
";

const SHOP_MEMBERS_SQL: &str = r"
CREATE TABLE shop_members (
    id UUID PRIMARY KEY,
    shop_id UUID NOT NULL REFERENCES shops(id),
    user_id UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_shop_members_shop_user UNIQUE (shop_id, user_id)
);

CREATE INDEX idx_shop_members_user ON shop_members(user_id);
";

const SUPPLIERS_SQL: &str = r"
CREATE TABLE suppliers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    owner_id UUID NOT NULL REFERENCES users(id),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_suppliers_owner ON suppliers(owner_id);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    barcode VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
";

const SHOP_PRODUCTS_SQL: &str = r"
CREATE TABLE shop_products (
    id UUID PRIMARY KEY,
    shop_id UUID NOT NULL REFERENCES shops(id),
    product_id UUID NOT NULL REFERENCES products(id),
    quantity_on_hand BIGINT NOT NULL,
    cost_price_cents BIGINT NOT NULL CHECK (cost_price_cents >= 0),
    low_stock_threshold BIGINT NOT NULL CHECK (low_stock_threshold >= 0),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_shop_products_shop_product UNIQUE (shop_id, product_id)
);

CREATE INDEX idx_shop_products_shop ON shop_products(shop_id);
";

const REGISTER_SESSIONS_SQL: &str = r"
CREATE TABLE register_sessions (
    id UUID PRIMARY KEY,
    shop_id UUID NOT NULL REFERENCES shops(id),
    opened_by UUID NOT NULL REFERENCES users(id),
    opening_cents BIGINT NOT NULL CHECK (opening_cents >= 0),
    status TEXT NOT NULL CHECK (status IN ('open', 'closed')),
    closing_notes TEXT,
    counted_cents BIGINT,
    difference_cents BIGINT,
    closed_by UUID REFERENCES users(id),
    opened_at TIMESTAMPTZ NOT NULL,
    closed_at TIMESTAMPTZ
);

CREATE INDEX idx_register_sessions_shop ON register_sessions(shop_id);
CREATE UNIQUE INDEX uq_register_sessions_open_shop
    ON register_sessions(shop_id) WHERE status = 'open';
";

const CASH_MOVEMENTS_SQL: &str = r"
CREATE TABLE cash_movements (
    id UUID PRIMARY KEY,
    session_id UUID NOT NULL REFERENCES register_sessions(id),
    kind TEXT NOT NULL CHECK (kind IN (
        'sale', 'purchase', 'income', 'expense', 'return', 'withdrawal', 'deposit'
    )),
    amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
    user_id UUID NOT NULL REFERENCES users(id),
    reference_type TEXT CHECK (reference_type IN (
        'sale', 'purchase', 'income', 'expense', 'return'
    )),
    reference_id UUID,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_cash_movements_session ON cash_movements(session_id, created_at);
";

const PURCHASES_SQL: &str = r"
CREATE TABLE purchases (
    id UUID PRIMARY KEY,
    shop_id UUID NOT NULL REFERENCES shops(id),
    supplier_id UUID REFERENCES suppliers(id),
    notes TEXT,
    total_cents BIGINT NOT NULL CHECK (total_cents >= 0),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_purchases_shop_created ON purchases(shop_id, created_at);
";

const PURCHASE_ITEMS_SQL: &str = r"
CREATE TABLE purchase_items (
    id UUID PRIMARY KEY,
    purchase_id UUID NOT NULL REFERENCES purchases(id),
    shop_product_id UUID NOT NULL REFERENCES shop_products(id),
    quantity BIGINT NOT NULL CHECK (quantity > 0),
    unit_cost_cents BIGINT NOT NULL CHECK (unit_cost_cents >= 0),
    subtotal_cents BIGINT NOT NULL CHECK (subtotal_cents >= 0),
    tax_included BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_purchase_items_purchase ON purchase_items(purchase_id);
";

const SALES_SQL: &str = r"
CREATE TABLE sales (
    id UUID PRIMARY KEY,
    shop_id UUID NOT NULL REFERENCES shops(id),
    notes TEXT,
    total_cents BIGINT NOT NULL CHECK (total_cents >= 0),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_sales_shop_created ON sales(shop_id, created_at);
";

const SALE_ITEMS_SQL: &str = r"
CREATE TABLE sale_items (
    id UUID PRIMARY KEY,
    sale_id UUID NOT NULL REFERENCES sales(id),
    shop_product_id UUID NOT NULL REFERENCES shop_products(id),
    quantity BIGINT NOT NULL CHECK (quantity > 0),
    unit_price_cents BIGINT NOT NULL CHECK (unit_price_cents >= 0),
    subtotal_cents BIGINT NOT NULL CHECK (subtotal_cents >= 0),
    tax_included BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_sale_items_sale ON sale_items(sale_id);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id UUID PRIMARY KEY,
    shop_product_id UUID NOT NULL REFERENCES shop_products(id),
    user_id UUID NOT NULL REFERENCES users(id),
    change_type TEXT NOT NULL CHECK (change_type IN (
        'purchase_in', 'sale_out', 'return_in', 'purchase_cancel_out', 'adjustment'
    )),
    quantity_before BIGINT NOT NULL,
    quantity_after BIGINT NOT NULL,
    cost_before_cents BIGINT NOT NULL,
    cost_after_cents BIGINT NOT NULL,
    note TEXT,
    purchase_id UUID REFERENCES purchases(id),
    sale_id UUID REFERENCES sales(id),
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_stock_movements_shop_product ON stock_movements(shop_product_id, created_at);
CREATE INDEX idx_stock_movements_purchase ON stock_movements(purchase_id);
CREATE INDEX idx_stock_movements_sale ON stock_movements(sale_id);
";

const DELETION_HISTORY_SQL: &str = r"
CREATE TABLE deletion_history (
    id UUID PRIMARY KEY,
    entity_type TEXT NOT NULL CHECK (entity_type IN ('purchase')),
    shop_name VARCHAR(255) NOT NULL,
    supplier_name VARCHAR(255),
    total_cents BIGINT NOT NULL,
    original_notes TEXT,
    items JSONB NOT NULL,
    deleted_by UUID NOT NULL REFERENCES users(id),
    reason TEXT NOT NULL,
    deleted_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_deletion_history_deleted_by ON deletion_history(deleted_by);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS deletion_history;
DROP TABLE IF EXISTS sale_items;
DROP TABLE IF EXISTS purchase_items;
DROP TABLE IF EXISTS stock_movements;
DROP TABLE IF EXISTS sales;
DROP TABLE IF EXISTS purchases;
DROP TABLE IF EXISTS cash_movements;
DROP TABLE IF EXISTS register_sessions;
DROP TABLE IF EXISTS shop_products;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS suppliers;
DROP TABLE IF EXISTS shop_members;
DROP TABLE IF EXISTS shops;
DROP TABLE IF EXISTS users;
";
