//! Session store for cookie-based login
//!
//! Sessions are opaque tokens with a fixed TTL; expiry is enforced at
//! lookup time rather than by a background sweeper.

use chrono::Utc;
use hw_common::db::models::User;
use hw_common::{auth, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_time, parse_guid, to_db_time};

/// Create a session for a logged-in user and return its token
pub async fn create(db: &SqlitePool, user_guid: Uuid, ttl_minutes: i64) -> Result<String> {
    let token = auth::new_session_token();
    let now = Utc::now();
    let expires_at = auth::session_expiry(ttl_minutes);

    sqlx::query(
        "INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&token)
    .bind(user_guid.to_string())
    .bind(to_db_time(now))
    .bind(to_db_time(expires_at))
    .execute(db)
    .await?;

    Ok(token)
}

/// Resolve a session token to its user, ignoring expired sessions
pub async fn lookup_valid(db: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT u.guid, u.email, u.password_hash, u.created_at
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(to_db_time(Utc::now()))
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => {
            let guid: String = row.get("guid");
            let created_at: String = row.get("created_at");
            Ok(Some(User {
                guid: parse_guid(&guid)?,
                email: row.get("email"),
                password_hash: row.get("password_hash"),
                created_at: from_db_time(&created_at)?,
            }))
        }
        None => Ok(None),
    }
}

/// Remove a session (logout). Removing an unknown token is not an error.
pub async fn delete(db: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}
