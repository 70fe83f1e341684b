//! Reconciliation Reporter: read-only recomputation of a closed
//! session's cash position.
//!
//! Nothing here writes. Given a closed session, the reporter re-runs the
//! pure fold over its committed movements, classifies the difference,
//! infers the closing mode from the free-text notes, and resolves every
//! referenced user for display. Calling it twice on the same rows yields
//! the same report.

use std::collections::BTreeSet;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tillbook_core::register::{
    ClosingMode, DifferenceStatus, ReconciliationTotals, RegisterError, infer_closing_mode,
    reconcile_movements,
};
use tillbook_shared::error::AppError;
use tillbook_shared::types::{Cents, SessionId, ShopId, UserId};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::SessionStatus;
use crate::entities::{register_sessions, users};
use crate::repositories::session::{load_session_movements, movement_amounts};

/// Error types for reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    /// Session not found.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// Only closed sessions can be reconciled.
    #[error("session {0} is not closed")]
    NotClosed(SessionId),

    /// The session is marked closed but is missing its counted amount.
    #[error("session {0} is closed without a counted amount")]
    IncompleteClose(SessionId),

    /// The fold arithmetic overflowed.
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReconciliationError> for AppError {
    fn from(error: ReconciliationError) -> Self {
        match error {
            ReconciliationError::NotFound(id) => Self::NotFound(format!("session {id}")),
            ReconciliationError::NotClosed(id) => {
                Self::Conflict(format!("session {id} is not closed"))
            }
            ReconciliationError::IncompleteClose(_) | ReconciliationError::Register(_) => {
                Self::Internal(error.to_string())
            }
            ReconciliationError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A user reference resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// The user's id.
    pub id: UserId,
    /// The user's display name.
    pub full_name: String,
}

/// The full reconciliation of one closed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// The reconciled session.
    pub session_id: SessionId,
    /// The session's shop.
    pub shop_id: ShopId,
    /// Who opened the session.
    pub opened_by: UserId,
    /// Who closed it.
    pub closed_by: Option<UserId>,
    /// Cash in the drawer at open.
    pub opening_cents: Cents,
    /// Per-kind totals and the expected drawer amount.
    pub totals: ReconciliationTotals,
    /// Physically counted amount at close.
    pub counted_cents: Cents,
    /// `counted - expected`.
    pub difference_cents: Cents,
    /// Three-way classification of the difference.
    pub difference_status: DifferenceStatus,
    /// Whether the session was closed automatically, inferred from the
    /// closing notes.
    pub closing_mode: ClosingMode,
    /// Every user referenced by the session or its movements, for
    /// display. Sorted by id.
    pub users: Vec<UserRef>,
}

/// Reconciliation Reporter.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Recomputes the reconciliation of a closed session.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::NotClosed`] when the session is
    /// still open, [`ReconciliationError::NotFound`] when it does not
    /// resolve.
    pub async fn reconcile(
        &self,
        session_id: SessionId,
    ) -> Result<ReconciliationReport, ReconciliationError> {
        let session = register_sessions::Entity::find_by_id(session_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::NotFound(session_id))?;
        if session.status != SessionStatus::Closed {
            return Err(ReconciliationError::NotClosed(session_id));
        }
        let counted_cents = session
            .counted_cents
            .ok_or(ReconciliationError::IncompleteClose(session_id))?;

        let movements = load_session_movements(&self.db, session.id).await?;
        let totals = reconcile_movements(session.opening_cents, &movement_amounts(&movements))?;

        let difference_cents = counted_cents
            .checked_sub(totals.expected_cents)
            .ok_or(RegisterError::AmountOverflow)?;
        let difference_status = DifferenceStatus::classify(difference_cents);
        let closing_mode = infer_closing_mode(session.closing_notes.as_deref());

        let mut referenced: BTreeSet<Uuid> = movements.iter().map(|m| m.user_id).collect();
        referenced.insert(session.opened_by);
        referenced.extend(session.closed_by);
        let users = self.resolve_users(&referenced).await?;

        Ok(ReconciliationReport {
            session_id,
            shop_id: ShopId::from_uuid(session.shop_id),
            opened_by: UserId::from_uuid(session.opened_by),
            closed_by: session.closed_by.map(UserId::from_uuid),
            opening_cents: session.opening_cents,
            totals,
            counted_cents,
            difference_cents,
            difference_status,
            closing_mode,
            users,
        })
    }

    /// Resolves user ids to display references, sorted by id.
    async fn resolve_users(
        &self,
        ids: &BTreeSet<Uuid>,
    ) -> Result<Vec<UserRef>, ReconciliationError> {
        let mut rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        rows.sort_by_key(|u| u.id);
        Ok(rows
            .into_iter()
            .map(|u| UserRef {
                id: UserId::from_uuid(u.id),
                full_name: u.full_name,
            })
            .collect())
    }
}
