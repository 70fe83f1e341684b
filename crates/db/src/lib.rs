//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - Repositories implementing the engine's write and read paths
//! - Database migrations
//! - The low-stock notification seam
//!
//! All multi-row writes run inside a single storage transaction; dropping
//! a transaction on an error path rolls it back, so a failed commit never
//! leaves partial state behind.

pub mod entities;
pub mod migration;
pub mod notify;
pub mod repositories;

pub use notify::{
    LoggingNotifier, LowStockNotifier, NotifyError, SilentNotifier, notifier_from_config,
};
pub use repositories::{
    DeletionRepository, PurchaseRepository, ReconciliationRepository, ReportRepository,
    SaleRepository, SessionRepository, StockLedgerRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tillbook_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a connection pool sized from the application config.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    Database::connect(options).await
}
