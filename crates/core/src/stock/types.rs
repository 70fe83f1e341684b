//! Domain types for stock changes.

use serde::{Deserialize, Serialize};
use tillbook_shared::types::{ProductId, ShopId, UserId};

/// Why a shop-product's quantity changed.
///
/// This is a closed set on purpose: the ledger fold and the history rows
/// both match on it exhaustively, so adding a variant forces every
/// consumer to decide what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChangeType {
    /// Goods received from a purchase.
    PurchaseIn,
    /// Goods sold to a customer.
    SaleOut,
    /// Goods returned by a customer.
    ReturnIn,
    /// Goods removed because a purchase was cancelled.
    PurchaseCancelOut,
    /// Manual correction by a person.
    Adjustment,
}

impl StockChangeType {
    /// Returns the canonical string form (matches the stored column).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PurchaseIn => "purchase_in",
            Self::SaleOut => "sale_out",
            Self::ReturnIn => "return_in",
            Self::PurchaseCancelOut => "purchase_cancel_out",
            Self::Adjustment => "adjustment",
        }
    }

    /// Parses a change type from its canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase_in" => Some(Self::PurchaseIn),
            "sale_out" => Some(Self::SaleOut),
            "return_in" => Some(Self::ReturnIn),
            "purchase_cancel_out" => Some(Self::PurchaseCancelOut),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }

    /// Whether this change overwrites the shop-product's unit cost.
    ///
    /// Only purchase receipts carry a cost: the latest purchase wins
    /// outright, there is no weighted-average costing. Every other change
    /// leaves cost untouched.
    #[must_use]
    pub const fn updates_cost(self) -> bool {
        matches!(self, Self::PurchaseIn)
    }
}

impl std::fmt::Display for StockChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A low-stock fact emitted after a stock change crosses the threshold.
///
/// Delivery is a collaborator concern; the engine only constructs the
/// fact and hands it to the notifier, fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    /// Shop the product belongs to.
    pub shop_id: ShopId,
    /// Catalog product.
    pub product_id: ProductId,
    /// Product display name, denormalized for the notification body.
    pub product_name: String,
    /// Quantity before the change.
    pub stock_before: i64,
    /// Quantity after the change.
    pub stock_after: i64,
    /// The shop's owner, addressee of the alert.
    pub owner_id: UserId,
}
