//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where a `ShopId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(ProjectId, "Unique identifier for a project (owner scope).");
typed_id!(ShopId, "Unique identifier for a shop.");
typed_id!(ProductId, "Unique identifier for a catalog product.");
typed_id!(
    ShopProductId,
    "Unique identifier for a product's stock-keeping unit within one shop."
);
typed_id!(StockMovementId, "Unique identifier for a stock movement.");
typed_id!(SupplierId, "Unique identifier for a supplier.");
typed_id!(SessionId, "Unique identifier for a cash-register session.");
typed_id!(CashMovementId, "Unique identifier for a cash movement.");
typed_id!(PurchaseId, "Unique identifier for a purchase.");
typed_id!(PurchaseItemId, "Unique identifier for a purchase line item.");
typed_id!(SaleId, "Unique identifier for a sale.");
typed_id!(SaleItemId, "Unique identifier for a sale line item.");
typed_id!(
    DeletionRecordId,
    "Unique identifier for a deletion audit record."
);
