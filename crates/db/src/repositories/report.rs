//! Time-series reporting reads.
//!
//! Thin queries over committed rows: fetch the rows in range, project
//! them onto [`SeriesPoint`]s, and hand the bucketing to the pure
//! builder in `tillbook_core::timeseries`. Reports never see rows from
//! transactions that rolled back, because those rows do not exist.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use tillbook_core::timeseries::{BucketUnit, SeriesError, SeriesPoint, TimeSeries, build_series};
use tillbook_shared::error::AppError;
use tillbook_shared::types::ShopId;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::CashMovementKind;
use crate::entities::{cash_movements, register_sessions, sales};

/// Error types for reporting reads.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The series could not be built from the fetched rows.
    #[error(transparent)]
    Series(#[from] SeriesError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportError> for AppError {
    fn from(error: ReportError) -> Self {
        match error {
            ReportError::Series(SeriesError::InvalidRange { .. }) => {
                Self::Validation(error.to_string())
            }
            ReportError::Series(SeriesError::AmountOverflow) => Self::Internal(error.to_string()),
            ReportError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Time-series aggregator.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Revenue per bucket: committed sale totals, bucketed by the sale's
    /// commit time.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Series`] for an inverted range.
    pub async fn sales_series(
        &self,
        shop_id: ShopId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        unit: BucketUnit,
    ) -> Result<TimeSeries, ReportError> {
        let rows = sales::Entity::find()
            .filter(sales::Column::ShopId.eq(Uuid::from(shop_id)))
            .filter(sales::Column::CreatedAt.gte(from))
            .filter(sales::Column::CreatedAt.lte(to))
            .all(&self.db)
            .await?;

        let points: Vec<SeriesPoint> = rows
            .iter()
            .map(|sale| SeriesPoint {
                occurred_at: sale.created_at.with_timezone(&Utc),
                amount_cents: sale.total_cents,
            })
            .collect();
        Ok(build_series(&points, from, to, unit)?)
    }

    /// Expenses per bucket: EXPENSE cash movements of the shop's
    /// sessions, bucketed by the movement's commit time.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Series`] for an inverted range.
    pub async fn expense_series(
        &self,
        shop_id: ShopId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        unit: BucketUnit,
    ) -> Result<TimeSeries, ReportError> {
        let rows = cash_movements::Entity::find()
            .join(
                JoinType::InnerJoin,
                cash_movements::Relation::RegisterSessions.def(),
            )
            .filter(register_sessions::Column::ShopId.eq(Uuid::from(shop_id)))
            .filter(cash_movements::Column::Kind.eq(CashMovementKind::Expense))
            .filter(cash_movements::Column::CreatedAt.gte(from))
            .filter(cash_movements::Column::CreatedAt.lte(to))
            .all(&self.db)
            .await?;

        let points: Vec<SeriesPoint> = rows
            .iter()
            .map(|movement| SeriesPoint {
                occurred_at: movement.created_at.with_timezone(&Utc),
                amount_cents: movement.amount_cents,
            })
            .collect();
        Ok(build_series(&points, from, to, unit)?)
    }
}
