//! `SeaORM` Entity for the stock_movements table.
//!
//! Append-only ledger of stock changes. Every row carries the quantity
//! and cost both before and after the change it records.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::StockChangeType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_product_id: Uuid,
    pub user_id: Uuid,
    pub change_type: StockChangeType,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub cost_before_cents: i64,
    pub cost_after_cents: i64,
    pub note: Option<String>,
    pub purchase_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop_products::Entity",
        from = "Column::ShopProductId",
        to = "super::shop_products::Column::Id"
    )]
    ShopProducts,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::purchases::Entity",
        from = "Column::PurchaseId",
        to = "super::purchases::Column::Id"
    )]
    Purchases,
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sales,
}

impl Related<super::shop_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopProducts.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
