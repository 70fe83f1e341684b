//! Input types for trade documents.

use serde::{Deserialize, Serialize};
use tillbook_shared::types::{Cents, ShopProductId};

/// One requested line item of a purchase or sale.
///
/// The subtotal is client-supplied and trusted as an input to the header
/// total; it is deliberately not cross-checked against
/// `quantity × unit_amount` (pricing adjustments land in the subtotal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeItemInput {
    /// The shop-product this line touches.
    pub shop_product_id: ShopProductId,
    /// Units bought or sold; strictly positive.
    pub quantity: i64,
    /// Unit cost (purchase) or unit price (sale) in cents.
    pub unit_amount_cents: Cents,
    /// Line subtotal in cents.
    pub subtotal_cents: Cents,
    /// Whether tax is already included in the amounts.
    pub tax_included: bool,
}
