//! Transactional sale processor.
//!
//! Structurally the purchase processor with the stock sign inverted:
//! the same validate-then-commit shape, negative stock deltas
//! (`sale_out`, cost untouched), and a SALE cash movement instead of a
//! PURCHASE one. The one extra rule is the insufficient-stock check,
//! which lives here — the stock ledger writer itself never rejects
//! negative resulting stock.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tillbook_core::register::CashMovementKind;
use tillbook_core::stock::{LowStockAlert, StockChangeType};
use tillbook_core::tenancy::{Actor, TenancyError, ensure_shop_access};
use tillbook_core::trade::{TradeItemInput, TradeValidationError, items_total, validate_items};
use tillbook_shared::error::AppError;
use tillbook_shared::types::{SaleId, SaleItemId, ShopId, ShopProductId};
use tracing::info;
use uuid::Uuid;

use crate::entities::{sale_items, sales};
use crate::notify::{self, LowStockNotifier};
use crate::repositories::access;
use crate::repositories::session::{self, MovementReference};
use crate::repositories::stock::{ApplyStockChange, StockError, apply_change_on};

/// Error types for sale operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    /// The requested item list is malformed.
    #[error(transparent)]
    Items(#[from] TradeValidationError),

    /// Shop not found.
    #[error("shop not found: {0}")]
    ShopNotFound(ShopId),

    /// The actor may not operate on this shop.
    #[error(transparent)]
    Access(#[from] TenancyError),

    /// Requested items did not all resolve within the target shop.
    #[error("items not belonging to this shop")]
    ForeignItems,

    /// Not enough stock on hand for a requested shop-product.
    #[error("insufficient stock for {shop_product_id}: {available} on hand, {requested} requested")]
    InsufficientStock {
        /// The shop-product short of stock.
        shop_product_id: ShopProductId,
        /// Quantity on hand at validation time.
        available: i64,
        /// Quantity requested, summed across the document's lines.
        requested: i64,
    },

    /// The shop has no open register session to take the cash movement.
    #[error("shop {0} has no open register session")]
    NoOpenSession(ShopId),

    /// Sale not found.
    #[error("sale not found: {0}")]
    NotFound(SaleId),

    /// A stock change failed during commit.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Database error. Storage conflicts surface here and are retryable.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SaleError> for AppError {
    fn from(error: SaleError) -> Self {
        match error {
            SaleError::Items(e) => Self::Validation(e.to_string()),
            SaleError::ShopNotFound(id) => Self::NotFound(format!("shop {id}")),
            SaleError::Access(e) => Self::Forbidden(e.to_string()),
            SaleError::ForeignItems => Self::Forbidden("items not belonging to this shop".into()),
            SaleError::InsufficientStock { .. } => Self::BusinessRule(error.to_string()),
            SaleError::NoOpenSession(id) => {
                Self::Conflict(format!("shop {id} has no open register session"))
            }
            SaleError::NotFound(id) => Self::NotFound(format!("sale {id}")),
            SaleError::Stock(e) => e.into(),
            SaleError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// The selling shop.
    pub shop_id: ShopId,
    /// Free-text header notes.
    pub notes: Option<String>,
    /// The requested line items; must be non-empty.
    pub items: Vec<TradeItemInput>,
}

/// A sale header with its line items.
#[derive(Debug, Clone)]
pub struct SaleWithItems {
    /// Sale header.
    pub sale: sales::Model,
    /// Line items in insertion order.
    pub items: Vec<sale_items::Model>,
}

/// Transactional sale processor.
#[derive(Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
    notifier: Arc<dyn LowStockNotifier>,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn LowStockNotifier>) -> Self {
        Self { db, notifier }
    }

    /// Creates a sale: header, items, stock deductions, and the SALE
    /// cash movement, all-or-nothing.
    ///
    /// Requested quantities are summed per shop-product and checked
    /// against quantity on hand before the commit begins; the stock
    /// writer itself would happily go negative.
    ///
    /// # Errors
    ///
    /// All validation errors fire strictly before any write. Once the
    /// commit begins, any failure rolls the whole write set back.
    pub async fn create_sale(
        &self,
        actor: &Actor,
        input: CreateSaleInput,
    ) -> Result<SaleWithItems, SaleError> {
        // Validation, strictly before any write.
        validate_items(&input.items)?;
        let total_cents = items_total(&input.items)?;

        let (_, scope) = access::load_shop(&self.db, input.shop_id)
            .await?
            .ok_or(SaleError::ShopNotFound(input.shop_id))?;
        let is_member = access::is_shop_member(&self.db, input.shop_id, actor.id).await?;
        ensure_shop_access(actor, &scope, is_member)?;

        self.ensure_items_available(input.shop_id, &input.items)
            .await?;

        let open_session = session::find_open_session(&self.db, Uuid::from(input.shop_id))
            .await?
            .ok_or(SaleError::NoOpenSession(input.shop_id))?;

        // Commit.
        let sale_id = SaleId::new();
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let sale = sales::ActiveModel {
            id: Set(sale_id.into_inner()),
            shop_id: Set(Uuid::from(input.shop_id)),
            notes: Set(input.notes.clone()),
            total_cents: Set(total_cents),
            created_by: Set(Uuid::from(actor.id)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        let mut alerts: Vec<LowStockAlert> = Vec::new();
        for item in &input.items {
            let row = sale_items::ActiveModel {
                id: Set(SaleItemId::new().into_inner()),
                sale_id: Set(sale_id.into_inner()),
                shop_product_id: Set(Uuid::from(item.shop_product_id)),
                quantity: Set(item.quantity),
                unit_price_cents: Set(item.unit_amount_cents),
                subtotal_cents: Set(item.subtotal_cents),
                tax_included: Set(item.tax_included),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
            items.push(row);

            let (_, alert) = apply_change_on(
                &txn,
                &ApplyStockChange {
                    shop_product_id: item.shop_product_id,
                    delta: -item.quantity,
                    actor_id: actor.id,
                    change_type: StockChangeType::SaleOut,
                    unit_cost_cents: None,
                    note: None,
                    purchase_id: None,
                    sale_id: Some(sale_id),
                },
            )
            .await?;
            alerts.extend(alert);
        }

        // A zero-total document moves no cash.
        if total_cents > 0 {
            session::insert_movement(
                &txn,
                open_session.id,
                CashMovementKind::Sale,
                total_cents,
                Uuid::from(actor.id),
                Some(MovementReference::Sale(sale_id)),
            )
            .await?;
        }

        txn.commit().await?;

        info!(
            sale_id = %sale_id,
            shop_id = %input.shop_id,
            total_cents,
            item_count = items.len(),
            "sale committed"
        );
        notify::emit_all(&self.notifier, &alerts).await;

        Ok(SaleWithItems { sale, items })
    }

    /// Gets a sale with its line items.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::NotFound`] if the sale does not resolve.
    pub async fn get_sale(&self, sale_id: SaleId) -> Result<SaleWithItems, SaleError> {
        let sale = sales::Entity::find_by_id(sale_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(SaleError::NotFound(sale_id))?;

        let items = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(sale_id.into_inner()))
            .order_by_asc(sale_items::Column::CreatedAt)
            .order_by_asc(sale_items::Column::Id)
            .all(&self.db)
            .await?;

        Ok(SaleWithItems { sale, items })
    }

    /// Resolves the requested items within the shop and checks the
    /// summed requested quantity per shop-product against quantity on
    /// hand. Lines may repeat a shop-product; the sum is what leaves
    /// the shelf.
    async fn ensure_items_available(
        &self,
        shop_id: ShopId,
        items: &[TradeItemInput],
    ) -> Result<(), SaleError> {
        let mut requested: BTreeMap<Uuid, i64> = BTreeMap::new();
        for item in items {
            let total = requested.entry(Uuid::from(item.shop_product_id)).or_insert(0);
            *total = total.saturating_add(item.quantity);
        }

        let ids: Vec<Uuid> = requested.keys().copied().collect();
        let resolved = access::resolve_shop_products(&self.db, shop_id, &ids).await?;
        if resolved.len() != requested.len() {
            return Err(SaleError::ForeignItems);
        }

        for sp in &resolved {
            let total = requested.get(&sp.id).copied().unwrap_or(0);
            if sp.quantity_on_hand < total {
                return Err(SaleError::InsufficientStock {
                    shop_product_id: ShopProductId::from_uuid(sp.id),
                    available: sp.quantity_on_hand,
                    requested: total,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_maps_to_app_error() {
        let insufficient = SaleError::InsufficientStock {
            shop_product_id: ShopProductId::new(),
            available: 3,
            requested: 5,
        };
        assert_eq!(AppError::from(insufficient).status_code(), 422);
        assert_eq!(AppError::from(SaleError::ForeignItems).status_code(), 403);
        assert_eq!(
            AppError::from(SaleError::NoOpenSession(ShopId::new())).status_code(),
            409
        );
    }
}
