use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Moderation endpoints. Authentication is enforced by the `AuthUser`
/// extractor in each handler's signature; the admin-only guard then runs
/// first in every handler body, so a valid non-admin caller gets 403 and an
/// unauthenticated one gets 401 before that.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users — full account listing.
        .route("/users", get(handlers::list_users))
        // Tag moderation: rename and delete. Deleting a tag removes only
        // its association rows, never the tagged posts.
        .route(
            "/tags/{id}",
            put(handlers::update_tag).delete(handlers::delete_tag),
        )
}
