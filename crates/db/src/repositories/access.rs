//! Shared tenancy lookups used by several repositories.
//!
//! These resolve the storage-side facts (who owns a shop, who is a
//! member) that the pure rules in `tillbook_core::tenancy` are then
//! applied to. Authorization itself never lives here.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use tillbook_core::tenancy::ShopScope;
use tillbook_shared::types::{ShopId, UserId};
use uuid::Uuid;

use crate::entities::{shop_members, shops};

/// Loads a shop row together with its ownership scope.
pub(crate) async fn load_shop<C: ConnectionTrait>(
    conn: &C,
    shop_id: ShopId,
) -> Result<Option<(shops::Model, ShopScope)>, DbErr> {
    let shop = shops::Entity::find_by_id(Uuid::from(shop_id)).one(conn).await?;
    Ok(shop.map(|shop| {
        let scope = ShopScope {
            shop_id,
            owner_id: UserId::from_uuid(shop.owner_id),
            project_id: shop.project_id.map(Into::into),
        };
        (shop, scope)
    }))
}

/// Resolves the requested shop-products within one shop.
///
/// Returns only rows that both exist and belong to the shop; callers
/// compare the result against the distinct requested ids and treat any
/// mismatch as a cross-tenant reference.
pub(crate) async fn resolve_shop_products<C: ConnectionTrait>(
    conn: &C,
    shop_id: ShopId,
    ids: &[Uuid],
) -> Result<Vec<crate::entities::shop_products::Model>, DbErr> {
    crate::entities::shop_products::Entity::find()
        .filter(crate::entities::shop_products::Column::Id.is_in(ids.iter().copied()))
        .filter(crate::entities::shop_products::Column::ShopId.eq(Uuid::from(shop_id)))
        .all(conn)
        .await
}

/// Whether the user is explicitly assigned to the shop.
pub(crate) async fn is_shop_member<C: ConnectionTrait>(
    conn: &C,
    shop_id: ShopId,
    user_id: UserId,
) -> Result<bool, DbErr> {
    let member = shop_members::Entity::find()
        .filter(shop_members::Column::ShopId.eq(Uuid::from(shop_id)))
        .filter(shop_members::Column::UserId.eq(Uuid::from(user_id)))
        .one(conn)
        .await?;
    Ok(member.is_some())
}
