//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Write paths validate against the pure rules in
//! `tillbook_core` before touching storage.

pub(crate) mod access;
pub mod deletion;
pub mod purchase;
pub mod reconciliation;
pub mod report;
pub mod sale;
pub mod session;
pub mod stock;

pub use deletion::{DeletionError, DeletionRepository, DeletionSummary};
pub use purchase::{
    CreatePurchaseInput, PurchaseError, PurchaseRepository, PurchaseWithItems, UpdatePurchaseInput,
};
pub use reconciliation::{
    ReconciliationError, ReconciliationReport, ReconciliationRepository, UserRef,
};
pub use report::{ReportError, ReportRepository};
pub use sale::{CreateSaleInput, SaleError, SaleRepository, SaleWithItems};
pub use session::{
    AppendMovementInput, CloseSessionInput, MovementReference, OpenSessionInput,
    SessionCloseOutcome, SessionError, SessionRepository,
};
pub use stock::{ApplyStockChange, StockChangeOutcome, StockError, StockLedgerRepository};
