//! `SeaORM` Entity for the deletion_history table.
//!
//! Append-only forensic record. Display fields are denormalized here so
//! the row stays meaningful after the referenced data is gone.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DeletedEntityKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "deletion_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_type: DeletedEntityKind,
    pub shop_name: String,
    pub supplier_name: Option<String>,
    pub total_cents: i64,
    pub original_notes: Option<String>,
    pub items: Json,
    pub deleted_by: Uuid,
    pub reason: String,
    pub deleted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DeletedBy",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
