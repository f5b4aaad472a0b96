//! Simulated emergency-alert recorder
//!
//! Alert records are audit entries: created once, never mutated.
//! Recipients are stored as a JSON snapshot of the user's contact
//! list at alert time.

use chrono::Utc;
use hw_common::db::models::{AlertRecord, ContactSnapshot};
use hw_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_time, parse_guid, to_db_time};

/// Record a simulated alert for a reading
pub async fn record(
    db: &SqlitePool,
    user_guid: Uuid,
    reading_guid: Uuid,
    location: Option<&str>,
    recipients: &[ContactSnapshot],
) -> Result<AlertRecord> {
    let alert = AlertRecord {
        guid: Uuid::new_v4(),
        user_guid,
        reading_guid,
        location: location.map(str::to_string),
        recipients: recipients.to_vec(),
        created_at: Utc::now(),
    };

    let recipients_json = serde_json::to_string(&alert.recipients)
        .map_err(|e| Error::Internal(format!("Failed to serialize recipients: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO alerts (guid, user_guid, reading_guid, location, recipients, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(alert.guid.to_string())
    .bind(alert.user_guid.to_string())
    .bind(alert.reading_guid.to_string())
    .bind(&alert.location)
    .bind(recipients_json)
    .bind(to_db_time(alert.created_at))
    .execute(db)
    .await?;

    Ok(alert)
}

/// A user's alert history, most recent first
pub async fn list(db: &SqlitePool, user_guid: Uuid, limit: i64) -> Result<Vec<AlertRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, user_guid, reading_guid, location, recipients, created_at
        FROM alerts
        WHERE user_guid = ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(user_guid.to_string())
    .bind(limit)
    .fetch_all(db)
    .await?;

    rows.iter().map(read_row).collect()
}

fn read_row(row: &sqlx::sqlite::SqliteRow) -> Result<AlertRecord> {
    let guid: String = row.get("guid");
    let user_guid: String = row.get("user_guid");
    let reading_guid: String = row.get("reading_guid");
    let recipients: String = row.get("recipients");
    let created_at: String = row.get("created_at");

    let recipients: Vec<ContactSnapshot> = serde_json::from_str(&recipients)
        .map_err(|e| Error::Internal(format!("Failed to deserialize recipients: {}", e)))?;

    Ok(AlertRecord {
        guid: parse_guid(&guid)?,
        user_guid: parse_guid(&user_guid)?,
        reading_guid: parse_guid(&reading_guid)?,
        location: row.get("location"),
        recipients,
        created_at: from_db_time(&created_at)?,
    })
}
