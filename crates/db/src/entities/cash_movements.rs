//! `SeaORM` Entity for the cash_movements table.
//!
//! Append-only. Amounts are strictly positive; direction is derived
//! from the movement kind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CashMovementKind, CashReferenceKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub kind: CashMovementKind,
    pub amount_cents: i64,
    pub user_id: Uuid,
    pub reference_type: Option<CashReferenceKind>,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::register_sessions::Entity",
        from = "Column::SessionId",
        to = "super::register_sessions::Column::Id"
    )]
    RegisterSessions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::register_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RegisterSessions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
