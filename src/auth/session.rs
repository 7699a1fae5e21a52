use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::db::models::Role;
use crate::db::StoreResult;
use crate::extractors::CurrentUser;
use crate::state::DbPool;

/// Create a new session for a user. Returns the session token.
pub fn create_session(pool: &DbPool, user_id: i64, hours: u64) -> StoreResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, user_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> StoreResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Resolve a live session to its user. Expired sessions and blocked users yield `None`.
pub fn resolve_session(pool: &DbPool, token: &str) -> StoreResult<Option<CurrentUser>> {
    let conn = pool.get()?;
    let row = conn
        .query_row(
            "SELECT u.id, u.name, u.role FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > datetime('now') AND u.is_blocked = 0",
            params![token],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(row.and_then(|(id, name, role)| {
        let role = role.parse::<Role>().ok()?;
        Some(CurrentUser { id, name, role })
    }))
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
