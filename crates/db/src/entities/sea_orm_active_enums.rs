//! String-backed enums for entity columns.
//!
//! Every discriminated column is stored as TEXT with a CHECK constraint
//! and surfaces here as a closed enum. Conversions to and from the
//! domain enums in `tillbook-core` live next to each definition.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global role of a user account.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum UserRole {
    /// Owns shops and suppliers.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Manages assigned shops.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Works in assigned shops.
    #[sea_orm(string_value = "employee")]
    Employee,
}

impl From<tillbook_core::tenancy::UserRole> for UserRole {
    fn from(role: tillbook_core::tenancy::UserRole) -> Self {
        match role {
            tillbook_core::tenancy::UserRole::Owner => Self::Owner,
            tillbook_core::tenancy::UserRole::Manager => Self::Manager,
            tillbook_core::tenancy::UserRole::Employee => Self::Employee,
        }
    }
}

impl From<UserRole> for tillbook_core::tenancy::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Owner => Self::Owner,
            UserRole::Manager => Self::Manager,
            UserRole::Employee => Self::Employee,
        }
    }
}

/// Lifecycle state of a register session.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SessionStatus {
    /// Accepting cash movements.
    #[sea_orm(string_value = "open")]
    Open,
    /// Counted and reconciled.
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl From<tillbook_core::register::SessionStatus> for SessionStatus {
    fn from(status: tillbook_core::register::SessionStatus) -> Self {
        match status {
            tillbook_core::register::SessionStatus::Open => Self::Open,
            tillbook_core::register::SessionStatus::Closed => Self::Closed,
        }
    }
}

impl From<SessionStatus> for tillbook_core::register::SessionStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Open => Self::Open,
            SessionStatus::Closed => Self::Closed,
        }
    }
}

/// Kind of a cash register movement.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CashMovementKind {
    /// Money in from a sale.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Money out for a purchase.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Other money in.
    #[sea_orm(string_value = "income")]
    Income,
    /// Other money out.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money out for a customer return.
    #[sea_orm(string_value = "return")]
    Return,
    /// Cash taken out of the drawer.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Cash added to the drawer.
    #[sea_orm(string_value = "deposit")]
    Deposit,
}

impl From<tillbook_core::register::CashMovementKind> for CashMovementKind {
    fn from(kind: tillbook_core::register::CashMovementKind) -> Self {
        use tillbook_core::register::CashMovementKind as Core;
        match kind {
            Core::Sale => Self::Sale,
            Core::Purchase => Self::Purchase,
            Core::Income => Self::Income,
            Core::Expense => Self::Expense,
            Core::Return => Self::Return,
            Core::Withdrawal => Self::Withdrawal,
            Core::Deposit => Self::Deposit,
        }
    }
}

impl From<CashMovementKind> for tillbook_core::register::CashMovementKind {
    fn from(kind: CashMovementKind) -> Self {
        match kind {
            CashMovementKind::Sale => Self::Sale,
            CashMovementKind::Purchase => Self::Purchase,
            CashMovementKind::Income => Self::Income,
            CashMovementKind::Expense => Self::Expense,
            CashMovementKind::Return => Self::Return,
            CashMovementKind::Withdrawal => Self::Withdrawal,
            CashMovementKind::Deposit => Self::Deposit,
        }
    }
}

/// Kind of a stock ledger movement.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum StockChangeType {
    /// Goods received from a purchase.
    #[sea_orm(string_value = "purchase_in")]
    PurchaseIn,
    /// Goods sold to a customer.
    #[sea_orm(string_value = "sale_out")]
    SaleOut,
    /// Goods returned by a customer.
    #[sea_orm(string_value = "return_in")]
    ReturnIn,
    /// Goods removed when a purchase is cancelled.
    #[sea_orm(string_value = "purchase_cancel_out")]
    PurchaseCancelOut,
    /// Manual stock correction.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl From<tillbook_core::stock::StockChangeType> for StockChangeType {
    fn from(change_type: tillbook_core::stock::StockChangeType) -> Self {
        use tillbook_core::stock::StockChangeType as Core;
        match change_type {
            Core::PurchaseIn => Self::PurchaseIn,
            Core::SaleOut => Self::SaleOut,
            Core::ReturnIn => Self::ReturnIn,
            Core::PurchaseCancelOut => Self::PurchaseCancelOut,
            Core::Adjustment => Self::Adjustment,
        }
    }
}

impl From<StockChangeType> for tillbook_core::stock::StockChangeType {
    fn from(change_type: StockChangeType) -> Self {
        match change_type {
            StockChangeType::PurchaseIn => Self::PurchaseIn,
            StockChangeType::SaleOut => Self::SaleOut,
            StockChangeType::ReturnIn => Self::ReturnIn,
            StockChangeType::PurchaseCancelOut => Self::PurchaseCancelOut,
            StockChangeType::Adjustment => Self::Adjustment,
        }
    }
}

/// What a cash movement references, when it was written by a processor.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CashReferenceKind {
    /// References a sales receipt.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// References a purchase record.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// References a standalone income entry.
    #[sea_orm(string_value = "income")]
    Income,
    /// References a standalone expense entry.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// References a customer return.
    #[sea_orm(string_value = "return")]
    Return,
}

/// Kind of record preserved in the deletion history.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum DeletedEntityKind {
    /// A purchase with its items.
    #[sea_orm(string_value = "purchase")]
    Purchase,
}
