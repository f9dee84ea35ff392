//! Access control guards.
//!
//! Three composable checks sit between the `AuthUser` extractor and every
//! mutating handler. Authentication itself is resolved by the extractor, so
//! by the time a guard runs the caller has a valid identity; a guard can
//! therefore only fail "forbidden", never "unauthenticated", which preserves
//! the required precedence between the two.

use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, repository::RepositoryState};

/// The resource kinds that carry an owner. For `User` the row itself is the
/// owner, for posts and comments ownership lives in their `user_id` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    User,
    Post,
    Comment,
}

/// Admin-only guard. Pass only if the caller's admin flag is set.
pub fn require_admin(auth: &AuthUser) -> Result<(), ApiError> {
    if auth.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Ownership assertion: binds the generic owner-only flow to a specific,
/// already-fetched resource. Handlers call this after loading their target
/// row, which avoids a second fetch and supports the case where the identity
/// itself is the resource key (updating one's own profile).
pub fn assert_owner(auth: &AuthUser, owner_id: Uuid) -> Result<(), ApiError> {
    if auth.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Admin-or-owner guard, parameterized by resource kind and id.
///
/// Looks up the target row's owner; the owner passes, anyone else passes
/// only with the admin flag. A missing resource deliberately falls through
/// to the admin check rather than short-circuiting to "not found" — the
/// handler's own fetch surfaces the 404 afterwards.
pub async fn require_admin_or_owner(
    repo: &RepositoryState,
    auth: &AuthUser,
    resource: OwnedResource,
    id: Uuid,
) -> Result<(), ApiError> {
    let owner = repo.resource_owner(resource, id).await?;
    if owner == Some(auth.id) {
        return Ok(());
    }
    require_admin(auth)
}
