//! Actor identity and shop access rules.
//!
//! Every engine entry point receives an already-authenticated [`Actor`];
//! authentication itself happens outside this crate. What the engine checks
//! is authorization: whether that actor may operate on, or owns, a given
//! shop. Owners reach a shop directly (`owner_id`) or through project
//! scoping; managers and employees must be explicitly assigned as members.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tillbook_shared::types::{ProjectId, ShopId, UserId};

/// Role of an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Owns shops, directly or via a project.
    Owner,
    /// Runs assigned shops day to day.
    Manager,
    /// Works in assigned shops.
    Employee,
}

impl UserRole {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    /// Parses a role from its canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "manager" => Some(Self::Manager),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An already-authenticated actor, as handed in by the surrounding
/// request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The actor's user ID.
    pub id: UserId,
    /// The actor's role.
    pub role: UserRole,
    /// Project scope, when the actor belongs to one.
    pub project_id: Option<ProjectId>,
}

impl Actor {
    /// Creates an actor with the given role and no project scope.
    #[must_use]
    pub const fn new(id: UserId, role: UserRole) -> Self {
        Self {
            id,
            role,
            project_id: None,
        }
    }

    /// Creates an owner actor, optionally project-scoped.
    #[must_use]
    pub const fn owner(id: UserId, project_id: Option<ProjectId>) -> Self {
        Self {
            id,
            role: UserRole::Owner,
            project_id,
        }
    }

    /// Creates a manager actor.
    #[must_use]
    pub const fn manager(id: UserId) -> Self {
        Self::new(id, UserRole::Manager)
    }

    /// Creates an employee actor.
    #[must_use]
    pub const fn employee(id: UserId) -> Self {
        Self::new(id, UserRole::Employee)
    }
}

/// Ownership facts about one shop, loaded from storage by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopScope {
    /// The shop in question.
    pub shop_id: ShopId,
    /// The shop's direct owner.
    pub owner_id: UserId,
    /// The shop's project, when it belongs to one.
    pub project_id: Option<ProjectId>,
}

/// Authorization failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TenancyError {
    /// The actor does not own the shop, directly or via project scope.
    #[error("shop {shop_id} does not belong to this owner")]
    NotShopOwner {
        /// The shop that was targeted.
        shop_id: ShopId,
    },
    /// The actor is not assigned to the shop.
    #[error("actor is not a member of shop {shop_id}")]
    NotShopMember {
        /// The shop that was targeted.
        shop_id: ShopId,
    },
}

/// Returns whether `actor` owns the shop, directly or via project scoping.
#[must_use]
pub fn owns_shop(actor: &Actor, scope: &ShopScope) -> bool {
    if actor.id == scope.owner_id {
        return true;
    }
    match (actor.project_id, scope.project_id) {
        (Some(actor_project), Some(shop_project)) => actor_project == shop_project,
        _ => false,
    }
}

/// Checks that the actor may operate on the shop at all.
///
/// Owners must own the shop (directly or via project); managers and
/// employees must be members. `is_member` is the membership fact for this
/// actor and shop, resolved by the caller.
///
/// # Errors
///
/// Returns a [`TenancyError`] describing the missing right.
pub fn ensure_shop_access(
    actor: &Actor,
    scope: &ShopScope,
    is_member: bool,
) -> Result<(), TenancyError> {
    match actor.role {
        UserRole::Owner => ensure_shop_owner(actor, scope),
        UserRole::Manager | UserRole::Employee => {
            if is_member {
                Ok(())
            } else {
                Err(TenancyError::NotShopMember {
                    shop_id: scope.shop_id,
                })
            }
        }
    }
}

/// Checks that the actor is the shop's owner (directly or via project).
///
/// Used for destructive operations that are owner-only regardless of
/// membership.
///
/// # Errors
///
/// Returns [`TenancyError::NotShopOwner`] otherwise.
pub fn ensure_shop_owner(actor: &Actor, scope: &ShopScope) -> Result<(), TenancyError> {
    if actor.role == UserRole::Owner && owns_shop(actor, scope) {
        Ok(())
    } else {
        Err(TenancyError::NotShopOwner {
            shop_id: scope.shop_id,
        })
    }
}
