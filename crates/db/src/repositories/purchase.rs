//! Transactional purchase processor.
//!
//! A purchase goes requested → validated → committed with no persisted
//! intermediate state: every check (actor access, supplier ownership,
//! shop-product resolution, open session) runs strictly before the first
//! write, and the commit itself — header, line items, stock changes with
//! their history rows, and the PURCHASE cash movement — is one storage
//! transaction. A failure anywhere in the commit rolls all of it back.
//!
//! Once committed, the item set and its stock effects are immutable;
//! later edits touch header metadata only.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tillbook_core::stock::{LowStockAlert, StockChangeType};
use tillbook_core::tenancy::{Actor, TenancyError, ensure_shop_access};
use tillbook_core::trade::{TradeItemInput, TradeValidationError, items_total, validate_items};
use tillbook_shared::error::AppError;
use tillbook_shared::types::{
    Cents, PageRequest, PageResponse, PurchaseId, PurchaseItemId, ShopId, SupplierId,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{purchase_items, purchases, suppliers};
use crate::notify::{self, LowStockNotifier};
use crate::repositories::access;
use crate::repositories::session::{self, MovementReference};
use crate::repositories::stock::{ApplyStockChange, StockError, apply_change_on};

/// Error types for purchase operations.
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    /// The requested item list is malformed.
    #[error(transparent)]
    Items(#[from] TradeValidationError),

    /// Shop not found.
    #[error("shop not found: {0}")]
    ShopNotFound(ShopId),

    /// Supplier not found.
    #[error("supplier not found: {0}")]
    SupplierNotFound(SupplierId),

    /// The supplier belongs to a different owner.
    #[error("supplier {0} does not belong to this actor")]
    ForeignSupplier(SupplierId),

    /// The actor may not operate on this shop.
    #[error(transparent)]
    Access(#[from] TenancyError),

    /// Requested items did not all resolve within the target shop.
    /// Deliberately an authorization failure, not a lookup failure: a
    /// mismatch signals a potential cross-tenant reference.
    #[error("items not belonging to this shop")]
    ForeignItems,

    /// The shop has no open register session to take the cash movement.
    #[error("shop {0} has no open register session")]
    NoOpenSession(ShopId),

    /// Purchase not found.
    #[error("purchase not found: {0}")]
    NotFound(PurchaseId),

    /// A stock change failed during commit.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Database error. Storage conflicts surface here and are retryable.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PurchaseError> for AppError {
    fn from(error: PurchaseError) -> Self {
        match error {
            PurchaseError::Items(e) => Self::Validation(e.to_string()),
            PurchaseError::ShopNotFound(id) => Self::NotFound(format!("shop {id}")),
            PurchaseError::SupplierNotFound(id) => Self::NotFound(format!("supplier {id}")),
            PurchaseError::ForeignSupplier(e) => {
                Self::Forbidden(format!("supplier {e} does not belong to this actor"))
            }
            PurchaseError::Access(e) => Self::Forbidden(e.to_string()),
            PurchaseError::ForeignItems => {
                Self::Forbidden("items not belonging to this shop".into())
            }
            PurchaseError::NoOpenSession(id) => {
                Self::Conflict(format!("shop {id} has no open register session"))
            }
            PurchaseError::NotFound(id) => Self::NotFound(format!("purchase {id}")),
            PurchaseError::Stock(e) => e.into(),
            PurchaseError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseInput {
    /// The shop receiving the goods.
    pub shop_id: ShopId,
    /// Optional supplier; must belong to the requesting actor.
    pub supplier_id: Option<SupplierId>,
    /// Free-text header notes.
    pub notes: Option<String>,
    /// The requested line items; must be non-empty.
    pub items: Vec<TradeItemInput>,
}

/// Header-metadata updates allowed after commit.
#[derive(Debug, Clone, Default)]
pub struct UpdatePurchaseInput {
    /// Replacement notes, when given.
    pub notes: Option<String>,
    /// Replacement supplier, when given; ownership is re-checked.
    pub supplier_id: Option<SupplierId>,
}

/// A purchase header with its line items.
#[derive(Debug, Clone)]
pub struct PurchaseWithItems {
    /// Purchase header.
    pub purchase: purchases::Model,
    /// Line items in insertion order.
    pub items: Vec<purchase_items::Model>,
}

/// Transactional purchase processor.
#[derive(Clone)]
pub struct PurchaseRepository {
    db: DatabaseConnection,
    notifier: Arc<dyn LowStockNotifier>,
}

impl PurchaseRepository {
    /// Creates a new purchase repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn LowStockNotifier>) -> Self {
        Self { db, notifier }
    }

    /// Creates a purchase: header, items, stock receipts, and the
    /// PURCHASE cash movement, all-or-nothing.
    ///
    /// The header total is computed server-side as the sum of line
    /// subtotals. Each item applies a positive stock delta and
    /// overwrites the shop-product's cost with the item's unit cost.
    /// The cash movement lands on the shop's currently open session;
    /// none is opened implicitly.
    ///
    /// # Errors
    ///
    /// All validation errors fire strictly before any write. Once the
    /// commit begins, any failure rolls the whole write set back.
    pub async fn create_purchase(
        &self,
        actor: &Actor,
        input: CreatePurchaseInput,
    ) -> Result<PurchaseWithItems, PurchaseError> {
        // Validation, strictly before any write.
        validate_items(&input.items)?;
        let total_cents = items_total(&input.items)?;

        let (_, scope) = access::load_shop(&self.db, input.shop_id)
            .await?
            .ok_or(PurchaseError::ShopNotFound(input.shop_id))?;
        let is_member = access::is_shop_member(&self.db, input.shop_id, actor.id).await?;
        ensure_shop_access(actor, &scope, is_member)?;

        if let Some(supplier_id) = input.supplier_id {
            ensure_supplier_owned(&self.db, actor, supplier_id).await?;
        }

        ensure_items_in_shop(&self.db, input.shop_id, &input.items).await?;

        let open_session = session::find_open_session(&self.db, Uuid::from(input.shop_id))
            .await?
            .ok_or(PurchaseError::NoOpenSession(input.shop_id))?;

        // Commit: one transaction for header, items, stock, history,
        // and the cash movement.
        let purchase_id = PurchaseId::new();
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let purchase = purchases::ActiveModel {
            id: Set(purchase_id.into_inner()),
            shop_id: Set(Uuid::from(input.shop_id)),
            supplier_id: Set(input.supplier_id.map(Uuid::from)),
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
            let row = purchase_items::ActiveModel {
                id: Set(PurchaseItemId::new().into_inner()),
                purchase_id: Set(purchase_id.into_inner()),
                shop_product_id: Set(Uuid::from(item.shop_product_id)),
                quantity: Set(item.quantity),
                unit_cost_cents: Set(item.unit_amount_cents),
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
                    delta: item.quantity,
                    actor_id: actor.id,
                    change_type: StockChangeType::PurchaseIn,
                    unit_cost_cents: Some(item.unit_amount_cents),
                    note: None,
                    purchase_id: Some(purchase_id),
                    sale_id: None,
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
                tillbook_core::register::CashMovementKind::Purchase,
                total_cents,
                Uuid::from(actor.id),
                Some(MovementReference::Purchase(purchase_id)),
            )
            .await?;
        }

        txn.commit().await?;

        info!(
            purchase_id = %purchase_id,
            shop_id = %input.shop_id,
            total_cents,
            item_count = items.len(),
            "purchase committed"
        );
        notify::emit_all(&self.notifier, &alerts).await;

        Ok(PurchaseWithItems { purchase, items })
    }

    /// Updates header metadata of a committed purchase.
    ///
    /// Line items and their stock effects are immutable once committed;
    /// only notes and the supplier reference may change.
    ///
    /// # Errors
    ///
    /// Returns an error if the purchase or its shop does not resolve,
    /// the actor lacks access, or a given supplier is not the actor's.
    pub async fn update_purchase(
        &self,
        actor: &Actor,
        purchase_id: PurchaseId,
        input: UpdatePurchaseInput,
    ) -> Result<purchases::Model, PurchaseError> {
        let purchase = purchases::Entity::find_by_id(purchase_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PurchaseError::NotFound(purchase_id))?;

        let shop_id = ShopId::from_uuid(purchase.shop_id);
        let (_, scope) = access::load_shop(&self.db, shop_id)
            .await?
            .ok_or(PurchaseError::ShopNotFound(shop_id))?;
        let is_member = access::is_shop_member(&self.db, shop_id, actor.id).await?;
        ensure_shop_access(actor, &scope, is_member)?;

        if let Some(supplier_id) = input.supplier_id {
            ensure_supplier_owned(&self.db, actor, supplier_id).await?;
        }

        let mut row: purchases::ActiveModel = purchase.into();
        if let Some(notes) = input.notes {
            row.notes = Set(Some(notes));
        }
        if let Some(supplier_id) = input.supplier_id {
            row.supplier_id = Set(Some(Uuid::from(supplier_id)));
        }
        row.updated_at = Set(Utc::now().into());

        Ok(row.update(&self.db).await?)
    }

    /// Gets a purchase with its line items.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::NotFound`] if the purchase does not
    /// resolve.
    pub async fn get_purchase(
        &self,
        purchase_id: PurchaseId,
    ) -> Result<PurchaseWithItems, PurchaseError> {
        let purchase = purchases::Entity::find_by_id(purchase_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PurchaseError::NotFound(purchase_id))?;

        let items = purchase_items::Entity::find()
            .filter(purchase_items::Column::PurchaseId.eq(purchase_id.into_inner()))
            .order_by_asc(purchase_items::Column::CreatedAt)
            .order_by_asc(purchase_items::Column::Id)
            .all(&self.db)
            .await?;

        Ok(PurchaseWithItems { purchase, items })
    }

    /// Lists a shop's purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_purchases(
        &self,
        shop_id: ShopId,
        page: &PageRequest,
    ) -> Result<PageResponse<purchases::Model>, PurchaseError> {
        let query = purchases::Entity::find()
            .filter(purchases::Column::ShopId.eq(Uuid::from(shop_id)));

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(purchases::Column::CreatedAt)
            .order_by_desc(purchases::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }
}

/// Checks that a supplier exists and belongs to the acting user.
pub(crate) async fn ensure_supplier_owned(
    db: &DatabaseConnection,
    actor: &Actor,
    supplier_id: SupplierId,
) -> Result<(), PurchaseError> {
    let supplier = suppliers::Entity::find_by_id(supplier_id.into_inner())
        .one(db)
        .await?
        .ok_or(PurchaseError::SupplierNotFound(supplier_id))?;
    if supplier.owner_id != Uuid::from(actor.id) {
        return Err(PurchaseError::ForeignSupplier(supplier_id));
    }
    Ok(())
}

/// Checks that every distinct requested shop-product resolves within the
/// target shop. A count mismatch is Forbidden, not NotFound: it signals
/// a potential cross-tenant reference.
async fn ensure_items_in_shop(
    db: &DatabaseConnection,
    shop_id: ShopId,
    items: &[TradeItemInput],
) -> Result<(), PurchaseError> {
    let distinct: BTreeSet<Uuid> = items
        .iter()
        .map(|item| Uuid::from(item.shop_product_id))
        .collect();
    let ids: Vec<Uuid> = distinct.iter().copied().collect();
    let resolved = access::resolve_shop_products(db, shop_id, &ids).await?;
    if resolved.len() != distinct.len() {
        return Err(PurchaseError::ForeignItems);
    }
    Ok(())
}

/// Sum of a purchase's line subtotals, for consumers that re-derive the
/// header total from persisted items.
#[must_use]
pub fn persisted_items_total(items: &[purchase_items::Model]) -> Option<Cents> {
    items
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.subtotal_cents))
}
