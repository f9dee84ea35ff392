use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unauthenticated endpoints: the identity gateway (register, login) and the
/// open read surface. Nothing here mutates owned resources.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /users — open registration; is_admin always false.
        .route("/users", post(handlers::register_user))
        // POST /users/login — issues a two-hour bearer token.
        .route("/users/login", post(handlers::login))
        // Open reads: posts with their nested authors, comments, and tags.
        .route("/posts", get(handlers::list_posts))
        .route("/posts/{id}", get(handlers::get_post))
        .route("/posts/{post_id}/comments", get(handlers::list_post_comments))
        // Open tag reads, including the posts carrying a given tag.
        .route("/tags", get(handlers::list_tags))
        .route("/tags/{id}", get(handlers::get_tag))
        .route("/tags/{id}/posts", get(handlers::get_posts_by_tag))
}
