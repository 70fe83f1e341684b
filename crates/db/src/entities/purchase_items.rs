//! `SeaORM` Entity for the purchase_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub shop_product_id: Uuid,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub subtotal_cents: i64,
    pub tax_included: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchases::Entity",
        from = "Column::PurchaseId",
        to = "super::purchases::Column::Id"
    )]
    Purchases,
    #[sea_orm(
        belongs_to = "super::shop_products::Entity",
        from = "Column::ShopProductId",
        to = "super::shop_products::Column::Id"
    )]
    ShopProducts,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::shop_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
