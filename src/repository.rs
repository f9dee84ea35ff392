use crate::guards::OwnedResource;
use crate::models::{
    Comment, CommentDetail, CreatePostRequest, NewUser, Post, PostDetail, Tag, UpdatePostRequest,
    User, UserChanges,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract persistence contract. Handlers and guards depend on this
/// trait only, never on the concrete store, which keeps the authorization
/// layer testable against a fixture database.
///
/// Error semantics: methods surface raw `sqlx` errors; the boundary
/// translation in `error.rs` turns unique violations into conflicts and
/// foreign-key violations into not-found. Fetches return `Ok(None)` for a
/// missing row; deletes return `Ok(false)` when nothing matched.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> sqlx::Result<User>;
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> sqlx::Result<Option<User>>;
    async fn list_users(&self) -> sqlx::Result<Vec<User>>;
    // Partial update; COALESCE keeps unspecified fields. `is_admin` is not
    // updatable through any path.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> sqlx::Result<Option<User>>;
    // Cascades to the user's posts and comments.
    async fn delete_user(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Posts ---
    async fn create_post(
        &self,
        user_id: Uuid,
        req: CreatePostRequest,
        date_created: NaiveDate,
    ) -> sqlx::Result<Post>;
    async fn get_post(&self, id: Uuid) -> sqlx::Result<Option<Post>>;
    // Enriched read shape: author, comments (with authors), tags.
    async fn get_post_detail(&self, id: Uuid) -> sqlx::Result<Option<PostDetail>>;
    async fn list_posts(&self) -> sqlx::Result<Vec<PostDetail>>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> sqlx::Result<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Comments ---
    async fn create_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: String,
        date_created: NaiveDate,
    ) -> sqlx::Result<Comment>;
    async fn get_comment(&self, id: Uuid) -> sqlx::Result<Option<Comment>>;
    async fn list_post_comments(&self, post_id: Uuid) -> sqlx::Result<Vec<CommentDetail>>;
    async fn update_comment(&self, id: Uuid, content: String) -> sqlx::Result<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Tags ---
    async fn create_tag(&self, name: String) -> sqlx::Result<Tag>;
    async fn get_tag(&self, id: Uuid) -> sqlx::Result<Option<Tag>>;
    async fn list_tags(&self) -> sqlx::Result<Vec<Tag>>;
    async fn update_tag(&self, id: Uuid, name: String) -> sqlx::Result<Option<Tag>>;
    // Removes association rows only; posts are untouched.
    async fn delete_tag(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Post ↔ Tag association ---
    // Returns false when the pair was already present.
    async fn tag_post(&self, post_id: Uuid, tag_id: Uuid) -> sqlx::Result<bool>;
    async fn untag_post(&self, post_id: Uuid, tag_id: Uuid) -> sqlx::Result<bool>;
    async fn list_post_tags(&self, post_id: Uuid) -> sqlx::Result<Vec<Tag>>;
    async fn list_posts_by_tag(&self, tag_id: Uuid) -> sqlx::Result<Vec<Post>>;

    // --- Ownership lookup for the admin-or-owner guard ---
    // `Ok(None)` when the resource does not exist; the guard falls through
    // to its admin check in that case.
    async fn resource_owner(
        &self,
        resource: OwnedResource,
        id: Uuid,
    ) -> sqlx::Result<Option<Uuid>>;
}

/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The `Repository` implementation backed by the SQLite pool. All writes are
/// single statements (or single statements with RETURNING), so each mutation
/// is atomic: a constraint violation leaves the store unchanged.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads the author for an enriched read shape. The foreign key makes a
    /// missing author impossible, so treat one as a store-level error.
    async fn author(&self, user_id: Uuid) -> sqlx::Result<User> {
        self.get_user(user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Assembles the full read shape for one post row.
    async fn detail_for(&self, post: Post) -> sqlx::Result<PostDetail> {
        let user = self.author(post.user_id).await?;
        let comments = self.list_post_comments(post.id).await?;
        let tags = self.list_post_tags(post.id).await?;
        Ok(PostDetail {
            id: post.id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            user,
            comments,
            tags,
            date_created: post.date_created,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password, first_name, last_name, is_admin";

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_user(&self, user: NewUser) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password, first_name, last_name, is_admin) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, username, email, password, first_name, last_name, is_admin",
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_users(&self) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users \
             SET username = COALESCE(?, username), \
                 email = COALESCE(?, email), \
                 password = COALESCE(?, password), \
                 first_name = COALESCE(?, first_name), \
                 last_name = COALESCE(?, last_name) \
             WHERE id = ? \
             RETURNING id, username, email, password, first_name, last_name, is_admin",
        )
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_user(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_post(
        &self,
        user_id: Uuid,
        req: CreatePostRequest,
        date_created: NaiveDate,
    ) -> sqlx::Result<Post> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (id, title, content, user_id, date_created) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, title, content, user_id, date_created",
        )
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.content)
        .bind(user_id)
        .bind(date_created)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_post(&self, id: Uuid) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            "SELECT id, title, content, user_id, date_created FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_post_detail(&self, id: Uuid) -> sqlx::Result<Option<PostDetail>> {
        match self.get_post(id).await? {
            Some(post) => Ok(Some(self.detail_for(post).await?)),
            None => Ok(None),
        }
    }

    async fn list_posts(&self) -> sqlx::Result<Vec<PostDetail>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, title, content, user_id, date_created FROM posts \
             ORDER BY date_created DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(posts.len());
        for post in posts {
            details.push(self.detail_for(post).await?);
        }
        Ok(details)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            "UPDATE posts \
             SET title = COALESCE(?, title), \
                 content = COALESCE(?, content) \
             WHERE id = ? \
             RETURNING id, title, content, user_id, date_created",
        )
        .bind(req.title)
        .bind(req.content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: String,
        date_created: NaiveDate,
    ) -> sqlx::Result<Comment> {
        // A nonexistent post_id trips the foreign key here, which the error
        // boundary reports as not-found.
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, content, user_id, post_id, date_created) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, content, user_id, post_id, date_created",
        )
        .bind(Uuid::new_v4())
        .bind(content)
        .bind(user_id)
        .bind(post_id)
        .bind(date_created)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_comment(&self, id: Uuid) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, content, user_id, post_id, date_created FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_post_comments(&self, post_id: Uuid) -> sqlx::Result<Vec<CommentDetail>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, user_id, post_id, date_created FROM comments \
             WHERE post_id = ? ORDER BY date_created ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(comments.len());
        for comment in comments {
            let user = self.author(comment.user_id).await?;
            details.push(CommentDetail {
                id: comment.id,
                content: comment.content,
                user_id: comment.user_id,
                post_id: comment.post_id,
                user,
                date_created: comment.date_created,
            });
        }
        Ok(details)
    }

    async fn update_comment(&self, id: Uuid, content: String) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = ? WHERE id = ? \
             RETURNING id, content, user_id, post_id, date_created",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_tag(&self, name: String) -> sqlx::Result<Tag> {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (id, name) VALUES (?, ?) RETURNING id, name")
            .bind(Uuid::new_v4())
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_tag(&self, id: Uuid) -> sqlx::Result<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_tags(&self) -> sqlx::Result<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn update_tag(&self, id: Uuid, name: String) -> sqlx::Result<Option<Tag>> {
        sqlx::query_as::<_, Tag>("UPDATE tags SET name = ? WHERE id = ? RETURNING id, name")
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_tag(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tag_post(&self, post_id: Uuid, tag_id: Uuid) -> sqlx::Result<bool> {
        // ON CONFLICT DO NOTHING keeps re-tagging idempotent at the store
        // level; rows_affected tells the handler whether anything changed.
        let result = sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn untag_post(&self, post_id: Uuid, tag_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM post_tags WHERE post_id = ? AND tag_id = ?")
            .bind(post_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_post_tags(&self, post_id: Uuid) -> sqlx::Result<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name FROM tags t \
             JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = ? ORDER BY t.name ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_posts_by_tag(&self, tag_id: Uuid) -> sqlx::Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            "SELECT p.id, p.title, p.content, p.user_id, p.date_created FROM posts p \
             JOIN post_tags pt ON pt.post_id = p.id \
             WHERE pt.tag_id = ? ORDER BY p.date_created DESC, p.id ASC",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn resource_owner(
        &self,
        resource: OwnedResource,
        id: Uuid,
    ) -> sqlx::Result<Option<Uuid>> {
        let sql = match resource {
            // A user row owns itself.
            OwnedResource::User => "SELECT id FROM users WHERE id = ?",
            OwnedResource::Post => "SELECT user_id FROM posts WHERE id = ?",
            OwnedResource::Comment => "SELECT user_id FROM comments WHERE id = ?",
        };
        sqlx::query_scalar::<_, Uuid>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
