//! Deletion Audit Trail: forensic snapshot before a destructive delete.
//!
//! Deleting a purchase is a two-phase sequence. Phase 1 builds a
//! denormalized snapshot (shop name, supplier name, every line with its
//! product name and barcode) and commits it to the append-only
//! `deletion_history` table. Phase 2, a second transaction, removes the
//! dependent stock movements, the line items, and the header. The order
//! is the point: a crash between the phases leaves the snapshot durable
//! and the purchase intact, never the other way round.
//!
//! Deleting a purchase does NOT reverse the stock it originally added.
//! That asymmetry is intentional; a true reversal belongs to a separate
//! void workflow with its own compensating ledger writes.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tillbook_core::audit::{AuditError, PurchaseSnapshot, SnapshotItem, validate_reason};
use tillbook_core::tenancy::{Actor, TenancyError, ensure_shop_owner};
use tillbook_shared::error::AppError;
use tillbook_shared::types::{DeletionRecordId, PurchaseId, ShopId};
use tracing::info;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::DeletedEntityKind;
use crate::entities::{
    deletion_history, products, purchase_items, purchases, shop_products, stock_movements,
    suppliers,
};
use crate::repositories::access;

/// Error types for deletion operations.
#[derive(Debug, thiserror::Error)]
pub enum DeletionError {
    /// The deletion reason failed validation.
    #[error(transparent)]
    Reason(#[from] AuditError),

    /// Purchase not found.
    #[error("purchase not found: {0}")]
    NotFound(PurchaseId),

    /// Shop not found.
    #[error("shop not found: {0}")]
    ShopNotFound(ShopId),

    /// Only the shop's owner may delete.
    #[error(transparent)]
    Access(#[from] TenancyError),

    /// A line item references a row that no longer resolves; the
    /// snapshot would be incomplete.
    #[error("purchase item {0} references a missing product")]
    DanglingItem(Uuid),

    /// The snapshot could not be serialized.
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Database error. Storage conflicts surface here and are retryable.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<DeletionError> for AppError {
    fn from(error: DeletionError) -> Self {
        match error {
            DeletionError::Reason(e) => Self::Validation(e.to_string()),
            DeletionError::NotFound(id) => Self::NotFound(format!("purchase {id}")),
            DeletionError::ShopNotFound(id) => Self::NotFound(format!("shop {id}")),
            DeletionError::Access(e) => Self::Forbidden(e.to_string()),
            DeletionError::DanglingItem(_) | DeletionError::Snapshot(_) => {
                Self::Internal(error.to_string())
            }
            DeletionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// What a completed deletion did.
#[derive(Debug, Clone)]
pub struct DeletionSummary {
    /// The audit record that outlives the deleted rows.
    pub record_id: DeletionRecordId,
    /// The purchase that was removed.
    pub purchase_id: PurchaseId,
    /// The snapshot as persisted.
    pub snapshot: PurchaseSnapshot,
    /// Stock movement rows removed in phase 2.
    pub deleted_movements: u64,
    /// Line item rows removed in phase 2.
    pub deleted_items: u64,
}

/// Deletion Audit Trail.
#[derive(Debug, Clone)]
pub struct DeletionRepository {
    db: DatabaseConnection,
}

impl DeletionRepository {
    /// Creates a new deletion repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Permanently deletes a purchase, preserving a forensic snapshot
    /// first.
    ///
    /// The reason is mandatory and must be at least ten characters after
    /// trimming; only the shop's owner (directly or via project scope)
    /// may delete. Stock quantities are not reversed.
    ///
    /// # Errors
    ///
    /// Validation and authorization failures fire before any write. A
    /// failure during phase 2 rolls back the deletes but leaves the
    /// committed snapshot in place.
    pub async fn delete_purchase(
        &self,
        actor: &Actor,
        purchase_id: PurchaseId,
        reason: &str,
    ) -> Result<DeletionSummary, DeletionError> {
        let reason = validate_reason(reason)?;

        let purchase = purchases::Entity::find_by_id(purchase_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DeletionError::NotFound(purchase_id))?;

        let shop_id = ShopId::from_uuid(purchase.shop_id);
        let (shop, scope) = access::load_shop(&self.db, shop_id)
            .await?
            .ok_or(DeletionError::ShopNotFound(shop_id))?;
        ensure_shop_owner(actor, &scope)?;

        let snapshot = self.build_snapshot(&purchase, &shop.name).await?;

        // Phase 1: commit the snapshot before anything is destroyed.
        let record_id = DeletionRecordId::new();
        deletion_history::ActiveModel {
            id: Set(record_id.into_inner()),
            entity_type: Set(DeletedEntityKind::Purchase),
            shop_name: Set(snapshot.shop_name.clone()),
            supplier_name: Set(snapshot.supplier_name.clone()),
            total_cents: Set(snapshot.total_cents),
            original_notes: Set(snapshot.original_notes.clone()),
            items: Set(serde_json::to_value(&snapshot.items)?),
            deleted_by: Set(Uuid::from(actor.id)),
            reason: Set(reason),
            deleted_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        // Phase 2: the destructive deletes, atomically. Stock stays as
        // it is; only the document and its history references go.
        let txn = self.db.begin().await?;
        let deleted_movements = stock_movements::Entity::delete_many()
            .filter(stock_movements::Column::PurchaseId.eq(purchase_id.into_inner()))
            .exec(&txn)
            .await?
            .rows_affected;
        let deleted_items = purchase_items::Entity::delete_many()
            .filter(purchase_items::Column::PurchaseId.eq(purchase_id.into_inner()))
            .exec(&txn)
            .await?
            .rows_affected;
        purchases::Entity::delete_by_id(purchase_id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(
            purchase_id = %purchase_id,
            record_id = %record_id,
            deleted_movements,
            deleted_items,
            "purchase deleted with audit snapshot"
        );

        Ok(DeletionSummary {
            record_id,
            purchase_id,
            snapshot,
            deleted_movements,
            deleted_items,
        })
    }

    /// Builds the denormalized snapshot of a purchase and its lines.
    async fn build_snapshot(
        &self,
        purchase: &purchases::Model,
        shop_name: &str,
    ) -> Result<PurchaseSnapshot, DeletionError> {
        let supplier_name = match purchase.supplier_id {
            Some(supplier_id) => suppliers::Entity::find_by_id(supplier_id)
                .one(&self.db)
                .await?
                .map(|s| s.name),
            None => None,
        };

        let items = purchase_items::Entity::find()
            .filter(purchase_items::Column::PurchaseId.eq(purchase.id))
            .order_by_asc(purchase_items::Column::CreatedAt)
            .order_by_asc(purchase_items::Column::Id)
            .all(&self.db)
            .await?;

        let mut snapshot_items = Vec::with_capacity(items.len());
        for item in items {
            let shop_product = shop_products::Entity::find_by_id(item.shop_product_id)
                .one(&self.db)
                .await?
                .ok_or(DeletionError::DanglingItem(item.id))?;
            let product = products::Entity::find_by_id(shop_product.product_id)
                .one(&self.db)
                .await?
                .ok_or(DeletionError::DanglingItem(item.id))?;

            snapshot_items.push(SnapshotItem {
                product_name: product.name,
                barcode: product.barcode,
                quantity: item.quantity,
                unit_cost_cents: item.unit_cost_cents,
                subtotal_cents: item.subtotal_cents,
                tax_included: item.tax_included,
            });
        }

        Ok(PurchaseSnapshot {
            shop_name: shop_name.to_owned(),
            supplier_name,
            total_cents: purchase.total_cents,
            original_notes: purchase.notes.clone(),
            items: snapshot_items,
        })
    }
}
