//! Cash Session Store: lifecycle of a register session and the movements
//! attached to it.
//!
//! A session goes open → closed, once. While open it accepts append-only
//! cash movements; at close the expected drawer amount is computed with
//! the same pure fold reconciliation uses, and the signed difference
//! against the counted amount is stored on the row. Closed sessions are
//! never mutated again.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tillbook_core::register::{
    CashMovementKind, DifferenceStatus, MovementAmount, ReconciliationTotals, RegisterError,
    reconcile_movements, validate_counted_amount, validate_movement_amount,
    validate_opening_amount,
};
use tillbook_core::tenancy::{Actor, TenancyError, ensure_shop_access};
use tillbook_shared::error::AppError;
use tillbook_shared::types::{Cents, PurchaseId, SaleId, SessionId, ShopId};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{CashReferenceKind, SessionStatus};
use crate::entities::{cash_movements, register_sessions};
use crate::repositories::access;

/// Error types for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Shop not found.
    #[error("shop not found: {0}")]
    ShopNotFound(ShopId),

    /// Session not found.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The shop already has an open session.
    #[error("shop {0} already has an open session")]
    AlreadyOpen(ShopId),

    /// The session is not open.
    #[error("session {0} is not open")]
    NotOpen(SessionId),

    /// The actor may not operate on this shop.
    #[error(transparent)]
    Access(#[from] TenancyError),

    /// Amount validation or fold arithmetic rejected the input.
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// Database error. Storage conflicts surface here and are retryable.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::ShopNotFound(id) => Self::NotFound(format!("shop {id}")),
            SessionError::NotFound(id) => Self::NotFound(format!("session {id}")),
            SessionError::AlreadyOpen(id) => {
                Self::Conflict(format!("shop {id} already has an open session"))
            }
            SessionError::NotOpen(id) => Self::Conflict(format!("session {id} is not open")),
            SessionError::Access(e) => Self::Forbidden(e.to_string()),
            SessionError::Register(RegisterError::AmountOverflow) => {
                Self::Internal("session totals overflowed".into())
            }
            SessionError::Register(e) => Self::Validation(e.to_string()),
            SessionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for opening a session.
#[derive(Debug, Clone, Copy)]
pub struct OpenSessionInput {
    /// The shop whose register is being opened.
    pub shop_id: ShopId,
    /// Cash placed in the drawer at open; non-negative.
    pub opening_cents: Cents,
}

/// What a cash movement references, when a processor wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementReference {
    /// A sales receipt.
    Sale(SaleId),
    /// A purchase record.
    Purchase(PurchaseId),
    /// A standalone income entry.
    Income(Uuid),
    /// A standalone expense entry.
    Expense(Uuid),
    /// A customer return.
    Return(Uuid),
}

impl MovementReference {
    const fn columns(self) -> (CashReferenceKind, Uuid) {
        match self {
            Self::Sale(id) => (CashReferenceKind::Sale, id.into_inner()),
            Self::Purchase(id) => (CashReferenceKind::Purchase, id.into_inner()),
            Self::Income(id) => (CashReferenceKind::Income, id),
            Self::Expense(id) => (CashReferenceKind::Expense, id),
            Self::Return(id) => (CashReferenceKind::Return, id),
        }
    }
}

/// Input for appending a cash movement to an open session.
#[derive(Debug, Clone, Copy)]
pub struct AppendMovementInput {
    /// The target session; must be open.
    pub session_id: SessionId,
    /// What kind of event this records; the sign is derived from it.
    pub kind: CashMovementKind,
    /// Positive magnitude in cents.
    pub amount_cents: Cents,
    /// The originating document, when there is one.
    pub reference: Option<MovementReference>,
}

/// Input for closing a session.
#[derive(Debug, Clone)]
pub struct CloseSessionInput {
    /// The session to close; must be open.
    pub session_id: SessionId,
    /// Physically counted drawer amount; non-negative.
    pub counted_cents: Cents,
    /// Free-text closing notes.
    pub closing_notes: Option<String>,
}

/// Result of closing a session.
#[derive(Debug, Clone)]
pub struct SessionCloseOutcome {
    /// The closed session row.
    pub session: register_sessions::Model,
    /// The fold over the session's movements at close time.
    pub totals: ReconciliationTotals,
    /// `counted - expected`.
    pub difference_cents: Cents,
    /// Three-way classification of the difference.
    pub difference_status: DifferenceStatus,
}

/// Cash Session Store.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a new session for a shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the opening amount is negative, the shop does
    /// not exist, the actor lacks access, or the shop already has an
    /// open session.
    pub async fn open_session(
        &self,
        actor: &Actor,
        input: OpenSessionInput,
    ) -> Result<register_sessions::Model, SessionError> {
        validate_opening_amount(input.opening_cents)?;

        let (_, scope) = access::load_shop(&self.db, input.shop_id)
            .await?
            .ok_or(SessionError::ShopNotFound(input.shop_id))?;
        let is_member = access::is_shop_member(&self.db, input.shop_id, actor.id).await?;
        ensure_shop_access(actor, &scope, is_member)?;

        if find_open_session(&self.db, Uuid::from(input.shop_id))
            .await?
            .is_some()
        {
            return Err(SessionError::AlreadyOpen(input.shop_id));
        }

        let now = Utc::now();
        let session = register_sessions::ActiveModel {
            id: Set(SessionId::new().into_inner()),
            shop_id: Set(Uuid::from(input.shop_id)),
            opened_by: Set(Uuid::from(actor.id)),
            opening_cents: Set(input.opening_cents),
            status: Set(SessionStatus::Open),
            closing_notes: Set(None),
            counted_cents: Set(None),
            difference_cents: Set(None),
            closed_by: Set(None),
            opened_at: Set(now.into()),
            closed_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        info!(
            session_id = %session.id,
            shop_id = %input.shop_id,
            opening_cents = input.opening_cents,
            "session opened"
        );
        Ok(session)
    }

    /// Appends one cash movement to an open session.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not strictly positive, the
    /// session does not exist or is not open, or the actor lacks access
    /// to the session's shop.
    pub async fn append_movement(
        &self,
        actor: &Actor,
        input: AppendMovementInput,
    ) -> Result<cash_movements::Model, SessionError> {
        validate_movement_amount(input.amount_cents)?;

        let session = self.load_open_session(actor, input.session_id).await?;

        let movement = insert_movement(
            &self.db,
            session.id,
            input.kind,
            input.amount_cents,
            Uuid::from(actor.id),
            input.reference,
        )
        .await?;

        debug!(
            session_id = %session.id,
            kind = %input.kind,
            amount_cents = input.amount_cents,
            "cash movement appended"
        );
        Ok(movement)
    }

    /// Closes an open session, storing counted amount, signed difference,
    /// and closing metadata.
    ///
    /// The expected amount is the reconciliation fold over the session's
    /// movements; the stored difference is `counted - expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the counted amount is negative, the session
    /// does not exist or is not open, or the actor lacks access.
    pub async fn close_session(
        &self,
        actor: &Actor,
        input: CloseSessionInput,
    ) -> Result<SessionCloseOutcome, SessionError> {
        validate_counted_amount(input.counted_cents)?;

        let session = self.load_open_session(actor, input.session_id).await?;

        let txn = self.db.begin().await?;
        // Re-read under a row lock; a concurrent closer may have won
        // between the access check and this transaction.
        let session = register_sessions::Entity::find_by_id(session.id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(SessionError::NotFound(input.session_id))?;
        if session.status != SessionStatus::Open {
            return Err(SessionError::NotOpen(input.session_id));
        }

        let movements = load_session_movements(&txn, session.id).await?;
        let totals = reconcile_movements(session.opening_cents, &movement_amounts(&movements))?;
        let difference_cents = input
            .counted_cents
            .checked_sub(totals.expected_cents)
            .ok_or(RegisterError::AmountOverflow)?;

        let mut row: register_sessions::ActiveModel = session.into();
        row.status = Set(SessionStatus::Closed);
        row.closing_notes = Set(input.closing_notes.clone());
        row.counted_cents = Set(Some(input.counted_cents));
        row.difference_cents = Set(Some(difference_cents));
        row.closed_by = Set(Some(Uuid::from(actor.id)));
        row.closed_at = Set(Some(Utc::now().into()));
        let session = row.update(&txn).await?;
        txn.commit().await?;

        let difference_status = DifferenceStatus::classify(difference_cents);
        info!(
            session_id = %session.id,
            expected_cents = totals.expected_cents,
            counted_cents = input.counted_cents,
            difference_cents,
            ?difference_status,
            "session closed"
        );

        Ok(SessionCloseOutcome {
            session,
            totals,
            difference_cents,
            difference_status,
        })
    }

    /// Returns the shop's currently open session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_open(
        &self,
        shop_id: ShopId,
    ) -> Result<Option<register_sessions::Model>, SessionError> {
        Ok(find_open_session(&self.db, Uuid::from(shop_id)).await?)
    }

    /// Loads a session, requiring it to be open and the actor to have
    /// access to its shop.
    async fn load_open_session(
        &self,
        actor: &Actor,
        session_id: SessionId,
    ) -> Result<register_sessions::Model, SessionError> {
        let session = register_sessions::Entity::find_by_id(session_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(SessionError::NotFound(session_id))?;
        if session.status != SessionStatus::Open {
            return Err(SessionError::NotOpen(session_id));
        }

        let shop_id = ShopId::from_uuid(session.shop_id);
        let (_, scope) = access::load_shop(&self.db, shop_id)
            .await?
            .ok_or(SessionError::ShopNotFound(shop_id))?;
        let is_member = access::is_shop_member(&self.db, shop_id, actor.id).await?;
        ensure_shop_access(actor, &scope, is_member)?;

        Ok(session)
    }
}

/// Finds the shop's open session, if any.
pub(crate) async fn find_open_session<C: ConnectionTrait>(
    conn: &C,
    shop_id: Uuid,
) -> Result<Option<register_sessions::Model>, DbErr> {
    register_sessions::Entity::find()
        .filter(register_sessions::Column::ShopId.eq(shop_id))
        .filter(register_sessions::Column::Status.eq(SessionStatus::Open))
        .one(conn)
        .await
}

/// Inserts one cash movement row. Shared by the public append path and
/// the purchase/sale processors, which call it inside their own
/// transaction.
pub(crate) async fn insert_movement<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
    kind: CashMovementKind,
    amount_cents: Cents,
    user_id: Uuid,
    reference: Option<MovementReference>,
) -> Result<cash_movements::Model, DbErr> {
    let (reference_type, reference_id) = match reference.map(MovementReference::columns) {
        Some((kind, id)) => (Some(kind), Some(id)),
        None => (None, None),
    };

    cash_movements::ActiveModel {
        id: Set(Uuid::now_v7()),
        session_id: Set(session_id),
        kind: Set(kind.into()),
        amount_cents: Set(amount_cents),
        user_id: Set(user_id),
        reference_type: Set(reference_type),
        reference_id: Set(reference_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Loads a session's movements in append order.
pub(crate) async fn load_session_movements<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
) -> Result<Vec<cash_movements::Model>, DbErr> {
    cash_movements::Entity::find()
        .filter(cash_movements::Column::SessionId.eq(session_id))
        .order_by_asc(cash_movements::Column::CreatedAt)
        .order_by_asc(cash_movements::Column::Id)
        .all(conn)
        .await
}

/// Projects movement rows onto the pure fold's input.
pub(crate) fn movement_amounts(movements: &[cash_movements::Model]) -> Vec<MovementAmount> {
    movements
        .iter()
        .map(|m| MovementAmount {
            kind: m.kind.clone().into(),
            amount_cents: m.amount_cents,
        })
        .collect()
}
