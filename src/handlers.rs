use crate::{
    AppState, auth,
    auth::AuthUser,
    error::ApiError,
    guards::{self, OwnedResource},
    models::{
        Comment, CommentDetail, CommentRequest, CreatePostRequest, LoginRequest, NewUser, Post,
        PostDetail, RegisterRequest, Tag, TagRequest, TokenResponse, UpdatePostRequest,
        UpdateUserRequest, User, UserChanges,
    },
    validate,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

// Conflict translation helpers: keep the generic store mapping, but name the
// colliding field set so the caller can act on the 409.

fn user_conflict(err: sqlx::Error) -> ApiError {
    match ApiError::from(err) {
        ApiError::Conflict(_) => ApiError::Conflict("username or email already in use".to_string()),
        other => other,
    }
}

fn tag_conflict(err: sqlx::Error) -> ApiError {
    match ApiError::from(err) {
        ApiError::Conflict(_) => ApiError::Conflict("tag name already in use".to_string()),
        other => other,
    }
}

// --- Users ---

/// register_user
///
/// [Public Route] Creates a new account. The password policy is checked
/// before hashing, and `is_admin` is always false here no matter what the
/// client sent — admin accounts are never created through registration.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 409, description = "Username or email taken", body = crate::error::ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    validate::validate_registration(&payload)?;
    let password = auth::hash_password(&payload.password)?;

    let user = state
        .repo
        .create_user(NewUser {
            id: Uuid::new_v4(),
            username: payload.username,
            email: payload.email,
            password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            is_admin: false,
        })
        .await
        .map_err(user_conflict)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// login
///
/// [Public Route] Verifies email + password and issues a two-hour bearer
/// token. A wrong email and a wrong password are indistinguishable to the
/// caller.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state.repo.get_user_by_email(&payload.email).await?;

    match user {
        Some(user) if auth::verify_password(&payload.password, &user.password) => {
            let token =
                auth::issue_token(user.id, &state.config.jwt_secret, auth::TOKEN_TTL_SECS)?;
            Ok(Json(TokenResponse { token }))
        }
        _ => Err(ApiError::Unauthenticated),
    }
}

/// get_me
///
/// [Authenticated Route] The caller's own profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state.repo.get_user(auth.id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user))
}

/// list_users
///
/// [Admin Route] Lists every account. Guarded by the admin-only check.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Not an admin", body = crate::error::ErrorBody)
    )
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    guards::require_admin(&auth)?;
    Ok(Json(state.repo.list_users().await?))
}

/// get_user
///
/// [Authenticated Route] A single user's profile, visible to any
/// authenticated caller. The password hash is never serialized.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "No such user", body = crate::error::ErrorBody)
    )
)]
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = state.repo.get_user(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user))
}

/// update_user
///
/// [Authenticated Route] Partial profile update, owner-only. The identity is
/// the resource key here, so the ownership assertion runs against the route
/// id directly — no fetch needed first. A supplied password is re-hashed;
/// `is_admin` is not updatable through this path at all.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 409, description = "Username or email taken", body = crate::error::ErrorBody)
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    guards::assert_owner(&auth, id)?;
    validate::validate_user_update(&payload)?;

    let password = match &payload.password {
        Some(plaintext) => Some(auth::hash_password(plaintext)?),
        None => None,
    };

    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        password,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };

    let user = state
        .repo
        .update_user(id, changes)
        .await
        .map_err(user_conflict)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user))
}

/// delete_user
///
/// [Authenticated Route] Removes an account, admin-or-owner. Deletion
/// cascades to the user's posts and comments (and comments on those posts);
/// tags survive minus their association rows.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "No such user", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    guards::require_admin_or_owner(&state.repo, &auth, OwnedResource::User, id).await?;

    if state.repo.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Posts ---

/// list_posts
///
/// [Public Route] All posts, newest first, each with author, comments and
/// tags loaded by explicit queries.
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "Posts", body = [PostDetail]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostDetail>>, ApiError> {
    Ok(Json(state.repo.list_posts().await?))
}

/// get_post
///
/// [Public Route] A single post in its full read shape.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDetail),
        (status = 404, description = "No such post", body = crate::error::ErrorBody)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = state
        .repo
        .get_post_detail(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

/// create_post
///
/// [Authenticated Route] Creates a post. The owner is the resolved identity;
/// a client-supplied owner field does not exist in the payload.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody)
    )
)]
pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    validate::validate_new_post(&payload)?;

    let post = state
        .repo
        .create_post(auth.id, payload, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Authenticated Route] Partial update, admin-or-owner(Post, id).
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "No such post", body = crate::error::ErrorBody)
    )
)]
pub async fn update_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    guards::require_admin_or_owner(&state.repo, &auth, OwnedResource::Post, id).await?;
    validate::validate_post_update(&payload)?;

    let post = state
        .repo
        .update_post(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

/// delete_post
///
/// [Authenticated Route] Removes a post, admin-or-owner. Comments and tag
/// associations go with it.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "No such post", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    guards::require_admin_or_owner(&state.repo, &auth, OwnedResource::Post, id).await?;

    if state.repo.delete_post(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Comments ---

/// list_post_comments
///
/// [Public Route] All comments on a post, oldest first, with authors.
#[utoipa::path(
    get,
    path = "/posts/{post_id}/comments",
    params(("post_id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments", body = [CommentDetail]),
        (status = 404, description = "No such post", body = crate::error::ErrorBody)
    )
)]
pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentDetail>>, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(state.repo.list_post_comments(post_id).await?))
}

/// create_comment
///
/// [Authenticated Route] Comments on a post. The owner is stamped from the
/// identity; a nonexistent post surfaces as not-found.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comments",
    params(("post_id" = Uuid, Path, description = "Post ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Created", body = Comment),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 404, description = "No such post", body = crate::error::ErrorBody)
    )
)]
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    validate::validate_comment(&payload)?;

    let comment = state
        .repo
        .create_comment(auth.id, post_id, payload.content, Utc::now().date_naive())
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// update_comment
///
/// [Authenticated Route] Edits a comment, owner-only: the handler loads the
/// target row and then runs the explicit ownership assertion against it.
#[utoipa::path(
    put,
    path = "/posts/{post_id}/comments/{comment_id}",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "No such comment", body = crate::error::ErrorBody)
    )
)]
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or(ApiError::NotFound)?;

    guards::assert_owner(&auth, comment.user_id)?;
    validate::validate_comment(&payload)?;

    let updated = state
        .repo
        .update_comment(comment_id, payload.content)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment, admin-or-owner(Comment, id).
#[utoipa::path(
    delete,
    path = "/posts/{post_id}/comments/{comment_id}",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "No such comment", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((_post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    guards::require_admin_or_owner(&state.repo, &auth, OwnedResource::Comment, comment_id).await?;

    if state.repo.delete_comment(comment_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Tags ---

/// list_tags
///
/// [Public Route] All tags, alphabetical.
#[utoipa::path(
    get,
    path = "/tags",
    responses((status = 200, description = "Tags", body = [Tag]))
)]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.repo.list_tags().await?))
}

/// get_tag
///
/// [Public Route] A single tag by id.
#[utoipa::path(
    get,
    path = "/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Found", body = Tag),
        (status = 404, description = "No such tag", body = crate::error::ErrorBody)
    )
)]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state.repo.get_tag(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(tag))
}

/// get_posts_by_tag
///
/// [Public Route] Every post carrying a given tag.
#[utoipa::path(
    get,
    path = "/tags/{id}/posts",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Posts", body = [Post]),
        (status = 404, description = "No such tag", body = crate::error::ErrorBody)
    )
)]
pub async fn get_posts_by_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Post>>, ApiError> {
    state.repo.get_tag(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(state.repo.list_posts_by_tag(id).await?))
}

/// create_tag
///
/// [Authenticated Route] Creates a tag. Names are globally unique; a
/// duplicate is a conflict, not a validation failure.
#[utoipa::path(
    post,
    path = "/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Created", body = Tag),
        (status = 409, description = "Name taken", body = crate::error::ErrorBody)
    )
)]
pub async fn create_tag(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    validate::validate_tag(&payload)?;

    let tag = state
        .repo
        .create_tag(payload.name)
        .await
        .map_err(tag_conflict)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// update_tag
///
/// [Admin Route] Renames a tag.
#[utoipa::path(
    put,
    path = "/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Updated", body = Tag),
        (status = 403, description = "Not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "No such tag", body = crate::error::ErrorBody)
    )
)]
pub async fn update_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagRequest>,
) -> Result<Json<Tag>, ApiError> {
    guards::require_admin(&auth)?;
    validate::validate_tag(&payload)?;

    let tag = state
        .repo
        .update_tag(id, payload.name)
        .await
        .map_err(tag_conflict)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(tag))
}

/// delete_tag
///
/// [Admin Route] Removes a tag. Posts are untouched beyond losing the
/// association rows.
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "No such tag", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    guards::require_admin(&auth)?;

    if state.repo.delete_tag(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// tag_post
///
/// [Authenticated Route] Attaches a tag to a post, admin-or-owner(Post, id).
/// Re-attaching an already-present tag reports a conflict and changes
/// nothing.
#[utoipa::path(
    put,
    path = "/posts/{post_id}/tags/{tag_id}",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("tag_id" = Uuid, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Attached"),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 409, description = "Already tagged", body = crate::error::ErrorBody)
    )
)]
pub async fn tag_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    guards::require_admin_or_owner(&state.repo, &auth, OwnedResource::Post, post_id).await?;

    if state.repo.tag_post(post_id, tag_id).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::Conflict("post already tagged".to_string()))
    }
}

/// untag_post
///
/// [Authenticated Route] Detaches a tag from a post, admin-or-owner.
#[utoipa::path(
    delete,
    path = "/posts/{post_id}/tags/{tag_id}",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("tag_id" = Uuid, Path, description = "Tag ID")
    ),
    responses(
        (status = 204, description = "Detached"),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "Not tagged", body = crate::error::ErrorBody)
    )
)]
pub async fn untag_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    guards::require_admin_or_owner(&state.repo, &auth, OwnedResource::Post, post_id).await?;

    if state.repo.untag_post(post_id, tag_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
