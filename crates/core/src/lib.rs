//! Core business logic for the Tillbook ledger and reconciliation engine.
//!
//! Everything in this crate is pure: no database handles, no network, no
//! clocks beyond timestamps passed in by callers. The persistence layer
//! (`tillbook-db`) feeds committed rows into these functions and writes
//! their results back out.
//!
//! Modules:
//! - [`stock`] - stock change types, delta arithmetic, low-stock crossing
//! - [`register`] - cash movement kinds, the reconciliation fold,
//!   difference classification, closing-mode inference
//! - [`trade`] - line-item validation and totals for purchases and sales
//! - [`tenancy`] - actor identity and shop access rules
//! - [`timeseries`] - calendar bucketing for reporting reads
//! - [`audit`] - deletion snapshots and reason validation

pub mod audit;
pub mod register;
pub mod stock;
pub mod tenancy;
pub mod timeseries;
pub mod trade;
