mod common;

use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use common::{seed_user, test_state};
use minornote::{
    auth::{self, AuthUser, TOKEN_TTL_SECS},
    config::Env,
    error::ApiError,
};
use uuid::Uuid;

const TEST_SECRET: &str = "minornote-local-test-secret";

fn request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Credential Verifier ---

#[tokio::test]
async fn password_hash_round_trip() {
    let hash = auth::hash_password("correct horse battery").unwrap();

    // Salted: the hash is never the plaintext, and verification is exact.
    assert_ne!(hash, "correct horse battery");
    assert!(auth::verify_password("correct horse battery", &hash));
    assert!(!auth::verify_password("wrong horse battery", &hash));
}

#[tokio::test]
async fn verify_never_raises_on_malformed_hash() {
    assert!(!auth::verify_password("anything", "not-a-bcrypt-hash"));
    assert!(!auth::verify_password("anything", ""));
}

// --- Identity Token ---

#[tokio::test]
async fn token_round_trip_within_ttl() {
    let user_id = Uuid::new_v4();
    let token = auth::issue_token(user_id, TEST_SECRET, TOKEN_TTL_SECS).unwrap();

    assert_eq!(auth::resolve_token(&token, TEST_SECRET).unwrap(), user_id);
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    // Expired well past the decoder's leeway window.
    let token = auth::issue_token(Uuid::new_v4(), TEST_SECRET, -300).unwrap();

    assert_eq!(
        auth::resolve_token(&token, TEST_SECRET).unwrap_err(),
        ApiError::Unauthenticated
    );
}

#[tokio::test]
async fn forged_token_is_unauthenticated() {
    let token = auth::issue_token(Uuid::new_v4(), "some-other-secret", TOKEN_TTL_SECS).unwrap();

    assert_eq!(
        auth::resolve_token(&token, TEST_SECRET).unwrap_err(),
        ApiError::Unauthenticated
    );
}

// --- AuthUser Extractor ---

#[tokio::test]
async fn extractor_resolves_valid_token() {
    let state = test_state().await;
    let user = seed_user(&state.repo, "alice", false).await;
    let token = auth::issue_token(user.id, &state.config.jwt_secret, TOKEN_TTL_SECS).unwrap();

    let mut parts = request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, user.id);
    assert!(!auth_user.is_admin);
}

#[tokio::test]
async fn extractor_rejects_missing_header() {
    let mut state = test_state().await;
    // Disable the local bypass path so the bearer flow is what's under test.
    state.config.env = Env::Production;

    let mut parts = request_parts(Method::GET, "/".parse().unwrap());
    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), ApiError::Unauthenticated);
}

#[tokio::test]
async fn extractor_rejects_token_for_deleted_user() {
    let state = test_state().await;
    let user = seed_user(&state.repo, "ghost", false).await;
    let token = auth::issue_token(user.id, &state.config.jwt_secret, TOKEN_TTL_SECS).unwrap();

    assert!(state.repo.delete_user(user.id).await.unwrap());

    let mut parts = request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthenticated);
}

#[tokio::test]
async fn local_bypass_resolves_existing_user() {
    let state = test_state().await;
    let user = seed_user(&state.repo, "dev", true).await;

    let mut parts = request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user.id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, user.id);
    assert!(auth_user.is_admin);
}

#[tokio::test]
async fn local_bypass_disabled_in_production() {
    let mut state = test_state().await;
    let user = seed_user(&state.repo, "dev", true).await;
    state.config.env = Env::Production;

    let mut parts = request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user.id.to_string()).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), ApiError::Unauthenticated);
}
