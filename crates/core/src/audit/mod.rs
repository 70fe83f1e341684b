//! Deletion audit primitives: reason validation and the denormalized
//! snapshot that outlives the deleted rows.
//!
//! The snapshot copies display data (names, barcodes) out of the live
//! tables so the audit record stays readable after the referenced rows
//! are gone.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tillbook_shared::types::Cents;

/// Minimum length of a deletion reason, in characters, after trimming.
pub const MIN_REASON_LEN: usize = 10;

/// Why a deletion request was rejected before touching the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// The supplied reason is too short to be a real justification.
    #[error("deletion reason must be at least {minimum} characters, got {length}")]
    ReasonTooShort {
        /// Character count of the trimmed reason.
        length: usize,
        /// The enforced minimum.
        minimum: usize,
    },
}

/// Validates a free-text deletion reason and returns it trimmed.
///
/// Length is counted in characters, not bytes, so multi-byte input is
/// not penalized.
pub fn validate_reason(raw: &str) -> Result<String, AuditError> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length < MIN_REASON_LEN {
        return Err(AuditError::ReasonTooShort {
            length,
            minimum: MIN_REASON_LEN,
        });
    }
    Ok(trimmed.to_owned())
}

/// One line of a deleted purchase, denormalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// Product name at deletion time.
    pub product_name: String,
    /// Product barcode at deletion time, when the product had one.
    pub barcode: Option<String>,
    /// Units on the line.
    pub quantity: i64,
    /// Cost per unit in cents.
    pub unit_cost_cents: Cents,
    /// Line subtotal in cents as originally recorded.
    pub subtotal_cents: Cents,
    /// Whether tax was included in the recorded amounts.
    pub tax_included: bool,
}

/// Everything worth keeping about a purchase that is about to be erased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSnapshot {
    /// Shop name at deletion time.
    pub shop_name: String,
    /// Supplier name at deletion time, when one was attached.
    pub supplier_name: Option<String>,
    /// Recorded purchase total in cents.
    pub total_cents: Cents,
    /// Free-text notes from the purchase header.
    pub original_notes: Option<String>,
    /// Every line of the purchase.
    pub items: Vec<SnapshotItem>,
}
