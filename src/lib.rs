use axum::{
    Json, Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod validate;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{RepositoryState, SqliteRepository};

/// ApiDoc
///
/// Aggregates every annotated handler and schema into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login, handlers::get_me, handlers::list_users,
        handlers::get_user, handlers::update_user, handlers::delete_user,
        handlers::list_posts, handlers::get_post, handlers::create_post,
        handlers::update_post, handlers::delete_post,
        handlers::list_post_comments, handlers::create_comment,
        handlers::update_comment, handlers::delete_comment,
        handlers::list_tags, handlers::get_tag, handlers::get_posts_by_tag,
        handlers::create_tag, handlers::update_tag, handlers::delete_tag,
        handlers::tag_post, handlers::untag_post
    ),
    components(
        schemas(
            models::User, models::Post, models::Comment, models::Tag,
            models::PostDetail, models::CommentDetail,
            models::RegisterRequest, models::LoginRequest, models::TokenResponse,
            models::UpdateUserRequest, models::CreatePostRequest, models::UpdatePostRequest,
            models::CommentRequest, models::TagRequest,
            error::ErrorBody, error::FieldError,
        )
    ),
    tags(
        (name = "minornote", description = "MinorNote blogging API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding the repository handle and the
/// immutable configuration, shared across all requests. No process-wide
/// singletons: everything the handlers need is injected through this struct.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer, behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
}

// FromRef implementations let extractors pull individual components out of
// the shared state (the AuthUser extractor needs both of these).

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route group. `AuthUser`
/// implements `FromRequestParts`, so a failed extraction rejects with 401
/// before the handler runs; a successful one lets the request proceed.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Generated OpenAPI document.
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated routes: rejected with 401 before any handler or
        // guard runs, which keeps unauthenticated ahead of forbidden.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin routes: the admin-only guard runs inside each handler after
        // the extractor has authenticated the caller.
        .merge(admin::admin_routes())
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Unique request id for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing spans correlated by that id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the request id to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Customizes span creation so every log line for a request carries its
/// method, URI, and correlation id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
