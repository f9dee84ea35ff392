mod common;

use common::{as_auth, seed_post, seed_user, test_state};
use minornote::{
    error::ApiError,
    guards::{self, OwnedResource},
};
use uuid::Uuid;

#[tokio::test]
async fn admin_only_matrix() {
    let state = test_state().await;
    let admin = seed_user(&state.repo, "admin", true).await;
    let user = seed_user(&state.repo, "plain", false).await;

    assert!(guards::require_admin(&as_auth(&admin)).is_ok());
    assert_eq!(
        guards::require_admin(&as_auth(&user)).unwrap_err(),
        ApiError::Forbidden
    );
}

#[tokio::test]
async fn ownership_assertion_binds_to_a_row() {
    let state = test_state().await;
    let owner = seed_user(&state.repo, "owner", false).await;
    let other = seed_user(&state.repo, "other", false).await;
    let post = seed_post(&state.repo, &owner, "guard fixture post").await;

    assert!(guards::assert_owner(&as_auth(&owner), post.user_id).is_ok());
    assert_eq!(
        guards::assert_owner(&as_auth(&other), post.user_id).unwrap_err(),
        ApiError::Forbidden
    );
}

#[tokio::test]
async fn admin_or_owner_accepts_the_owner() {
    let state = test_state().await;
    let owner = seed_user(&state.repo, "owner", false).await;
    let post = seed_post(&state.repo, &owner, "owned by a non-admin").await;

    // Owner passes even without the admin flag.
    let result =
        guards::require_admin_or_owner(&state.repo, &as_auth(&owner), OwnedResource::Post, post.id)
            .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn admin_or_owner_accepts_a_foreign_admin() {
    let state = test_state().await;
    let owner = seed_user(&state.repo, "owner", false).await;
    let admin = seed_user(&state.repo, "admin", true).await;
    let post = seed_post(&state.repo, &owner, "moderated post").await;

    let result =
        guards::require_admin_or_owner(&state.repo, &as_auth(&admin), OwnedResource::Post, post.id)
            .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn admin_or_owner_rejects_a_foreign_non_admin() {
    let state = test_state().await;
    let owner = seed_user(&state.repo, "owner", false).await;
    let other = seed_user(&state.repo, "other", false).await;
    let post = seed_post(&state.repo, &owner, "not yours to edit").await;

    let result =
        guards::require_admin_or_owner(&state.repo, &as_auth(&other), OwnedResource::Post, post.id)
            .await;
    assert_eq!(result.unwrap_err(), ApiError::Forbidden);
}

#[tokio::test]
async fn missing_resource_falls_through_to_the_admin_check() {
    let state = test_state().await;
    let admin = seed_user(&state.repo, "admin", true).await;
    let user = seed_user(&state.repo, "plain", false).await;
    let missing = Uuid::new_v4();

    // No short-circuit to not-found: the admin proceeds (the handler's own
    // fetch reports the 404), the plain user is forbidden.
    assert!(
        guards::require_admin_or_owner(&state.repo, &as_auth(&admin), OwnedResource::Post, missing)
            .await
            .is_ok()
    );
    assert_eq!(
        guards::require_admin_or_owner(&state.repo, &as_auth(&user), OwnedResource::Post, missing)
            .await
            .unwrap_err(),
        ApiError::Forbidden
    );
}

#[tokio::test]
async fn user_rows_own_themselves() {
    let state = test_state().await;
    let user = seed_user(&state.repo, "selfowned", false).await;

    let owner = state
        .repo
        .resource_owner(OwnedResource::User, user.id)
        .await
        .unwrap();
    assert_eq!(owner, Some(user.id));
}
