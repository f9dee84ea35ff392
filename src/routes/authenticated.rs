use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind the auth middleware in `create_router`, so
/// handlers always receive a resolved `AuthUser`. The finer-grained checks
/// (owner-only, admin-or-owner) run inside the handlers via the guards
/// module, since ownership is a per-row fact the router cannot see.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me — the caller's own profile.
        .route("/me", get(handlers::get_me))
        // Profile access: reads are open to any authenticated user; update
        // is owner-only (self); delete is admin-or-owner.
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Post authoring. Owner stamped from the identity on create;
        // update/delete are admin-or-owner(Post, id).
        .route("/posts", post(handlers::create_post))
        .route(
            "/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        // Commenting. Update is owner-only with an explicit ownership
        // assertion after the fetch; delete is admin-or-owner(Comment, id).
        .route("/posts/{post_id}/comments", post(handlers::create_comment))
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
        // Tag creation is open to any authenticated user.
        .route("/tags", post(handlers::create_tag))
        // Attaching/detaching tags follows the post's ownership.
        .route(
            "/posts/{post_id}/tags/{tag_id}",
            put(handlers::tag_post).delete(handlers::untag_post),
        )
}
