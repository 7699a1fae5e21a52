// User Store - account rows, roles and block flags
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::{Role, User, UserWithPostCount};
use crate::db::{StoreError, StoreResult};
use crate::state::DbPool;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Every user with the number of posts they own, ordered by id.
    async fn list_with_post_counts(&self) -> StoreResult<Vec<UserWithPostCount>>;

    async fn set_blocked(&self, id: i64, blocked: bool) -> StoreResult<()>;
}

pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_role(idx: usize, raw: String) -> rusqlite::Result<Role> {
    raw.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: parse_role(4, row.get(4)?)?,
        is_blocked: row.get(5)?,
        bio: row.get(6)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_blocked, bio";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let conn = self.pool.get()?;

        let inserted = conn.execute(
            "INSERT INTO users (name, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
            params![user.name, user.email, user.password_hash, user.role.as_str()],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::Conflict(format!(
                    "{} is already registered",
                    user.email
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            user_from_row,
        )
        .map_err(StoreError::from)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    async fn list_with_post_counts(&self) -> StoreResult<Vec<UserWithPostCount>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.email, u.role, u.bio, u.is_blocked, COUNT(p.id) AS post_count
             FROM users u
             LEFT JOIN posts p ON p.user_id = u.id
             GROUP BY u.id
             ORDER BY u.id",
        )?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserWithPostCount {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    role: parse_role(3, row.get(3)?)?,
                    bio: row.get(4)?,
                    is_blocked: row.get(5)?,
                    post_count: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn set_blocked(&self, id: i64, blocked: bool) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE users SET is_blocked = ?1 WHERE id = ?2",
            params![blocked, id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound("User".into()));
        }
        if blocked {
            conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![id])?;
        }
        Ok(())
    }
}
