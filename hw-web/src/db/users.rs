//! User account store

use chrono::Utc;
use hw_common::db::models::User;
use hw_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_time, parse_guid, to_db_time};

/// Create a new user account. The caller must have checked for an
/// existing email; a race on the UNIQUE constraint surfaces as a
/// database error.
pub async fn create(db: &SqlitePool, email: &str, password_hash: &str) -> Result<User> {
    let user = User {
        guid: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (guid, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user.guid.to_string())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(to_db_time(user.created_at))
    .execute(db)
    .await?;

    Ok(user)
}

pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT guid, email, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    row.as_ref().map(read_row).transpose()
}

pub async fn find_by_guid(db: &SqlitePool, guid: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT guid, email, password_hash, created_at FROM users WHERE guid = ?",
    )
    .bind(guid.to_string())
    .fetch_optional(db)
    .await?;

    row.as_ref().map(read_row).transpose()
}

fn read_row(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let guid: String = row.get("guid");
    let created_at: String = row.get("created_at");

    Ok(User {
        guid: parse_guid(&guid)?,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: from_db_time(&created_at)?,
    })
}
