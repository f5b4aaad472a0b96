//! Emergency contact directory
//!
//! The ingestion pipeline only reads this table (to snapshot
//! recipients into alert records); CRUD is driven by the contact
//! endpoints.

use chrono::Utc;
use hw_common::db::models::EmergencyContact;
use hw_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_time, parse_guid, to_db_time};

/// A user's contacts, most recently added first
pub async fn list(db: &SqlitePool, user_guid: Uuid) -> Result<Vec<EmergencyContact>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, user_guid, name, phone, email, created_at
        FROM contacts
        WHERE user_guid = ?
        ORDER BY created_at DESC, guid DESC
        "#,
    )
    .bind(user_guid.to_string())
    .fetch_all(db)
    .await?;

    rows.iter().map(read_row).collect()
}

pub async fn add(
    db: &SqlitePool,
    user_guid: Uuid,
    name: &str,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<EmergencyContact> {
    let contact = EmergencyContact {
        guid: Uuid::new_v4(),
        user_guid,
        name: name.to_string(),
        phone: phone.map(str::to_string),
        email: email.map(str::to_string),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO contacts (guid, user_guid, name, phone, email, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(contact.guid.to_string())
    .bind(contact.user_guid.to_string())
    .bind(&contact.name)
    .bind(&contact.phone)
    .bind(&contact.email)
    .bind(to_db_time(contact.created_at))
    .execute(db)
    .await?;

    Ok(contact)
}

/// Delete a contact owned by the given user. Returns false when no
/// such contact exists (or it belongs to someone else).
pub async fn delete(db: &SqlitePool, user_guid: Uuid, contact_guid: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM contacts WHERE guid = ? AND user_guid = ?")
        .bind(contact_guid.to_string())
        .bind(user_guid.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn read_row(row: &sqlx::sqlite::SqliteRow) -> Result<EmergencyContact> {
    let guid: String = row.get("guid");
    let user_guid: String = row.get("user_guid");
    let created_at: String = row.get("created_at");

    Ok(EmergencyContact {
        guid: parse_guid(&guid)?,
        user_guid: parse_guid(&user_guid)?,
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        created_at: from_db_time(&created_at)?,
    })
}
