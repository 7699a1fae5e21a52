// Post Store - every SQL statement touching the posts table lives here
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::{Post, PostKind};
use crate::db::{StoreError, StoreResult};
use crate::state::DbPool;

/// A post as submitted, before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub user_id: i64,
    pub tag: String,
    pub kind: PostKind,
    pub content: String,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> StoreResult<Post>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>>;

    /// Returns whether a row was actually removed.
    async fn delete_by_id(&self, id: i64) -> StoreResult<bool>;

    /// Newest first, skipping `offset` rows.
    async fn list_page(&self, limit: u32, offset: u64) -> StoreResult<Vec<Post>>;

    async fn count(&self) -> StoreResult<u64>;

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Post>>;
}

pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, user_id, tag, type, content, created_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let kind: String = row.get(3)?;
    let kind = kind.parse::<PostKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        tag: row.get(2)?,
        kind,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create(&self, post: NewPost) -> StoreResult<Post> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO posts (user_id, tag, type, content) VALUES (?1, ?2, ?3, ?4)",
            params![post.user_id, post.tag, post.kind.as_str(), post.content],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
            params![id],
            post_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound("Post".into()))
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
                params![id],
                post_from_row,
            )
            .optional()?;
        Ok(post)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    async fn list_page(&self, limit: u32, offset: u64) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            POST_COLUMNS
        ))?;
        // SQLite binds integers as i64
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let posts = stmt
            .query_map(params![i64::from(limit), offset], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    async fn count(&self) -> StoreResult<u64> {
        let conn = self.pool.get()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(total.max(0) as u64)
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map(params![user_id], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}
