//! Database bootstrap: connection pool and schema.
//!
//! The cascade rules in the DDL are load-bearing: deleting a user removes
//! their posts and comments (and comments attached to those posts), while
//! deleting a tag removes only `post_tags` rows. SQLite only enforces them
//! with `foreign_keys` enabled, which the pool options set per connection.

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          BLOB PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    first_name  TEXT,
    last_name   TEXT,
    is_admin    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS posts (
    id           BLOB PRIMARY KEY,
    title        TEXT NOT NULL,
    content      TEXT,
    user_id      BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date_created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id           BLOB PRIMARY KEY,
    content      TEXT NOT NULL,
    user_id      BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    post_id      BLOB NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    date_created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    id   BLOB PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS post_tags (
    post_id BLOB NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    tag_id  BLOB NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (post_id, tag_id)
);
"#;

/// Opens a pool against `db_url`, creating the database file if needed.
pub async fn connect(db_url: &str) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Single-connection in-memory pool for tests. One connection means the
/// database lives exactly as long as the pool.
pub async fn connect_memory() -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect_with(options)
        .await
}

/// Applies the schema. Idempotent; runs at startup.
pub async fn init_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
