#![allow(dead_code)]

use minornote::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    db,
    models::{NewUser, Post, Tag, User},
    repository::{RepositoryState, SqliteRepository},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpassword";

/// Fresh application state over an in-memory database with the schema
/// applied. Each test gets its own isolated store.
pub async fn test_state() -> AppState {
    let pool = db::connect_memory().await.expect("open in-memory db");
    db::init_schema(&pool).await.expect("apply schema");

    AppState {
        repo: Arc::new(SqliteRepository::new(pool)) as RepositoryState,
        config: AppConfig::default(),
    }
}

/// Inserts a user directly through the repository. Low bcrypt cost keeps the
/// suite fast; the production path uses the default cost.
pub async fn seed_user(repo: &RepositoryState, username: &str, is_admin: bool) -> User {
    let password = bcrypt::hash(TEST_PASSWORD, 4).expect("hash test password");
    repo.create_user(NewUser {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password,
        first_name: None,
        last_name: None,
        is_admin,
    })
    .await
    .expect("seed user")
}

pub async fn seed_post(repo: &RepositoryState, owner: &User, title: &str) -> Post {
    repo.create_post(
        owner.id,
        minornote::models::CreatePostRequest {
            title: title.to_string(),
            content: Some("testcontent".to_string()),
        },
        Utc::now().date_naive(),
    )
    .await
    .expect("seed post")
}

pub async fn seed_tag(repo: &RepositoryState, name: &str) -> Tag {
    repo.create_tag(name.to_string()).await.expect("seed tag")
}

/// The guard-facing view of a seeded user.
pub fn as_auth(user: &User) -> AuthUser {
    AuthUser {
        id: user.id,
        is_admin: user.is_admin,
    }
}
