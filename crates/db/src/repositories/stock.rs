//! Stock Ledger Writer: the only path that changes a shop-product's
//! quantity or cost.
//!
//! Every invocation performs one atomic unit: read the current row
//! (row-locked), write the new quantity and cost, and insert exactly one
//! `stock_movements` row capturing before and after. Nothing else in the
//! system is allowed to update those columns, which keeps the history
//! invariant enforceable at a single choke point.
//!
//! The writer deliberately does not reject negative resulting stock;
//! callers that care (the sale processor) check availability before
//! invoking it.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QuerySelect, Set, TransactionTrait,
};
use tillbook_core::stock::{
    LowStockAlert, StockChangeError, StockChangeType, apply_delta, crosses_low_stock,
};
use tillbook_shared::error::AppError;
use tillbook_shared::types::{
    Cents, ProductId, PurchaseId, SaleId, ShopId, ShopProductId, StockMovementId, UserId,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{products, shop_products, shops, stock_movements};
use crate::notify::{self, LowStockNotifier};

/// Error types for stock ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    /// Shop-product not found.
    #[error("shop-product not found: {0}")]
    NotFound(ShopProductId),

    /// Delta arithmetic rejected the change.
    #[error(transparent)]
    Change(#[from] StockChangeError),

    /// Database error. Storage conflicts surface here and are retryable.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<StockError> for AppError {
    fn from(error: StockError) -> Self {
        match error {
            StockError::NotFound(id) => Self::NotFound(format!("shop-product {id}")),
            StockError::Change(e) => Self::Validation(e.to_string()),
            StockError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for one stock change.
#[derive(Debug, Clone)]
pub struct ApplyStockChange {
    /// The shop-product to mutate.
    pub shop_product_id: ShopProductId,
    /// Signed quantity delta: positive for receipts and returns,
    /// negative for sales, cancellations, and manual decreases.
    pub delta: i64,
    /// The acting user, recorded on the movement.
    pub actor_id: UserId,
    /// Why the quantity changed.
    pub change_type: StockChangeType,
    /// New unit cost; applied only when the change type carries one
    /// (purchase receipts overwrite cost, latest purchase wins).
    pub unit_cost_cents: Option<Cents>,
    /// Optional free-text note on the movement.
    pub note: Option<String>,
    /// The purchase that caused this change, when there is one.
    pub purchase_id: Option<PurchaseId>,
    /// The sale that caused this change, when there is one.
    pub sale_id: Option<SaleId>,
}

/// Before/after snapshot returned by every stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChangeOutcome {
    /// The history row that was written.
    pub movement_id: StockMovementId,
    /// The mutated shop-product.
    pub shop_product_id: ShopProductId,
    /// Quantity before the change.
    pub quantity_before: i64,
    /// Quantity after the change.
    pub quantity_after: i64,
    /// Unit cost before the change.
    pub cost_before_cents: Cents,
    /// Unit cost after the change.
    pub cost_after_cents: Cents,
}

/// Stock Ledger Writer.
#[derive(Clone)]
pub struct StockLedgerRepository {
    db: DatabaseConnection,
    notifier: Arc<dyn LowStockNotifier>,
}

impl StockLedgerRepository {
    /// Creates a new stock ledger repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn LowStockNotifier>) -> Self {
        Self { db, notifier }
    }

    /// Applies a stock change in its own transaction.
    ///
    /// On success the change is committed and any low-stock alert is
    /// emitted afterwards, fire-and-forget: notifier failures are logged
    /// and swallowed and can never fail or delay the stock change.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::NotFound`] if the shop-product does not
    /// resolve, [`StockError::Change`] if the delta overflows, and
    /// [`StockError::Database`] for storage failures (retryable).
    pub async fn apply_stock_change(
        &self,
        input: ApplyStockChange,
    ) -> Result<StockChangeOutcome, StockError> {
        let txn = self.db.begin().await?;
        let (outcome, alert) = apply_change_on(&txn, &input).await?;
        txn.commit().await?;

        debug!(
            shop_product_id = %outcome.shop_product_id,
            change_type = %input.change_type,
            delta = input.delta,
            quantity_before = outcome.quantity_before,
            quantity_after = outcome.quantity_after,
            "stock change committed"
        );

        if let Some(alert) = alert {
            notify::emit_all(&self.notifier, &[alert]).await;
        }

        Ok(outcome)
    }

    /// Applies a stock change inside a caller-provided transaction.
    ///
    /// Used by the purchase/sale processors so their whole write set
    /// stays one transaction. Any low-stock alert is returned instead of
    /// emitted; the caller emits it after its own commit.
    ///
    /// # Errors
    ///
    /// As [`StockLedgerRepository::apply_stock_change`].
    pub async fn apply_in_txn(
        &self,
        txn: &DatabaseTransaction,
        input: &ApplyStockChange,
    ) -> Result<(StockChangeOutcome, Option<LowStockAlert>), StockError> {
        apply_change_on(txn, input).await
    }
}

/// The single choke point for stock mutation: read-locked row, new
/// quantity and cost written back, one movement row inserted.
pub(crate) async fn apply_change_on<C: ConnectionTrait>(
    conn: &C,
    input: &ApplyStockChange,
) -> Result<(StockChangeOutcome, Option<LowStockAlert>), StockError> {
    let shop_product = shop_products::Entity::find_by_id(Uuid::from(input.shop_product_id))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(StockError::NotFound(input.shop_product_id))?;

    let quantity_before = shop_product.quantity_on_hand;
    let quantity_after = apply_delta(quantity_before, input.delta)?;
    let cost_before_cents = shop_product.cost_price_cents;
    let cost_after_cents = if input.change_type.updates_cost() {
        input.unit_cost_cents.unwrap_or(cost_before_cents)
    } else {
        cost_before_cents
    };

    let now = Utc::now();
    let threshold = shop_product.low_stock_threshold;
    let shop_id = shop_product.shop_id;
    let product_id = shop_product.product_id;

    let mut row: shop_products::ActiveModel = shop_product.into();
    row.quantity_on_hand = Set(quantity_after);
    row.cost_price_cents = Set(cost_after_cents);
    row.updated_at = Set(now.into());
    row.update(conn).await?;

    let movement_id = StockMovementId::new();
    stock_movements::ActiveModel {
        id: Set(movement_id.into_inner()),
        shop_product_id: Set(Uuid::from(input.shop_product_id)),
        user_id: Set(Uuid::from(input.actor_id)),
        change_type: Set(input.change_type.into()),
        quantity_before: Set(quantity_before),
        quantity_after: Set(quantity_after),
        cost_before_cents: Set(cost_before_cents),
        cost_after_cents: Set(cost_after_cents),
        note: Set(input.note.clone()),
        purchase_id: Set(input.purchase_id.map(Uuid::from)),
        sale_id: Set(input.sale_id.map(Uuid::from)),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await?;

    let alert = if crosses_low_stock(quantity_before, quantity_after, threshold) {
        build_alert(conn, shop_id, product_id, quantity_before, quantity_after).await?
    } else {
        None
    };

    let outcome = StockChangeOutcome {
        movement_id,
        shop_product_id: input.shop_product_id,
        quantity_before,
        quantity_after,
        cost_before_cents,
        cost_after_cents,
    };
    Ok((outcome, alert))
}

/// Resolves the display data an alert carries. A dangling product or
/// shop reference quietly yields no alert rather than failing the
/// stock change.
async fn build_alert<C: ConnectionTrait>(
    conn: &C,
    shop_id: Uuid,
    product_id: Uuid,
    stock_before: i64,
    stock_after: i64,
) -> Result<Option<LowStockAlert>, StockError> {
    let product = products::Entity::find_by_id(product_id).one(conn).await?;
    let shop = shops::Entity::find_by_id(shop_id).one(conn).await?;

    Ok(product.zip(shop).map(|(product, shop)| LowStockAlert {
        shop_id: ShopId::from_uuid(shop_id),
        product_id: ProductId::from_uuid(product_id),
        product_name: product.name,
        stock_before,
        stock_after,
        owner_id: UserId::from_uuid(shop.owner_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_maps_to_app_error() {
        let id = ShopProductId::new();
        assert_eq!(AppError::from(StockError::NotFound(id)).status_code(), 404);
        assert_eq!(
            AppError::from(StockError::Change(StockChangeError::QuantityOverflow {
                quantity_before: i64::MAX,
                delta: 1,
            }))
            .status_code(),
            400
        );
    }
}
