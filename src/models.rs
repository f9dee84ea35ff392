use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. The stored `password` is
/// a bcrypt hash and is never serialized back to a caller, including when the
/// user appears nested inside posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash, write-only.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// RBAC flag. Default false; only settable at creation time, never
    /// through the update path.
    pub is_admin: bool,
}

/// Post
///
/// A blog post row. Ownership (`user_id`) is stamped from the authenticated
/// identity at creation and is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    // FK to users.id (owner). Cascade-deleted with the owner.
    pub user_id: Uuid,
    pub date_created: NaiveDate,
}

/// Comment
///
/// A comment row. Cascade-deleted with either parent (owner or post).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub date_created: NaiveDate,
}

/// Tag
///
/// Globally unique label, attached to posts through the `post_tags`
/// association table. Deleting a tag removes association rows only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

// --- Enriched Read Models (Output) ---

/// CommentDetail
///
/// A comment together with its author, loaded by explicit id-based queries
/// rather than ORM back-references.
#[derive(Debug, Clone, Serialize, ToSchema, Default)]
pub struct CommentDetail {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub user: User,
    pub date_created: NaiveDate,
}

/// PostDetail
///
/// The full read shape of a post: author, comments (each with author) and
/// tags. The nested `User` never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema, Default)]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub user_id: Uuid,
    pub user: User,
    pub comments: Vec<CommentDetail>,
    pub tags: Vec<Tag>,
    pub date_created: NaiveDate,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input for `POST /users`. Deliberately has no `is_admin` field: a
/// client-supplied override is ignored and registration always creates a
/// non-admin account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// LoginRequest
///
/// Input for `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// TokenResponse
///
/// Output of a successful login: a bearer token carrying the user id claim,
/// valid for two hours.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TokenResponse {
    pub token: String,
}

/// UpdateUserRequest
///
/// Partial update for `PUT /users/{id}`. Unset fields retain their prior
/// values. A supplied password is re-hashed before persistence. There is no
/// `is_admin` field here on purpose.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// CreatePostRequest
///
/// Input for `POST /posts`. The owner is taken from the resolved identity,
/// never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: Option<String>,
}

/// UpdatePostRequest
///
/// Partial update for `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// CommentRequest
///
/// Input for creating or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentRequest {
    pub content: String,
}

/// TagRequest
///
/// Input for creating or renaming a tag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TagRequest {
    pub name: String,
}

// --- Internal Write Models ---

/// NewUser
///
/// Repository-level insert shape. `password` is already hashed by the time
/// this struct exists; handlers construct it and decide `is_admin`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

/// UserChanges
///
/// Repository-level partial update shape for users. The password, when
/// present, is already hashed. Ownership of posts/comments and the admin
/// flag are not representable here by construction.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
