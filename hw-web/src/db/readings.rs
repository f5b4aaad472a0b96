//! Reading history store
//!
//! Append-only: readings are never updated or deleted. The
//! `UNIQUE(user_guid, ts, bpm)` constraint makes appends idempotent
//! per reading, which is how re-uploads of the same file are
//! deduplicated.

use chrono::{DateTime, Utc};
use hw_common::db::models::{StoredReading, Tag};
use hw_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_time, parse_guid, to_db_time};
use crate::ingest::CandidateReading;

/// Result of one append attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted(Uuid),
    /// (user, ts, bpm) already present; nothing was written
    Duplicate,
}

/// Append one classified reading to a user's history
pub async fn append(
    db: &SqlitePool,
    user_guid: Uuid,
    candidate: &CandidateReading,
    tag: Tag,
) -> Result<AppendOutcome> {
    let guid = Uuid::new_v4();

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO readings (guid, user_guid, ts, bpm, label, tag, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(user_guid.to_string())
    .bind(to_db_time(candidate.ts))
    .bind(candidate.bpm)
    .bind(candidate.label)
    .bind(tag.as_str())
    .bind(to_db_time(Utc::now()))
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        Ok(AppendOutcome::Duplicate)
    } else {
        Ok(AppendOutcome::Inserted(guid))
    }
}

/// Readings within [from, to], oldest first
pub async fn query_range(
    db: &SqlitePool,
    user_guid: Uuid,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<StoredReading>> {
    // Open bounds collapse to sentinels that sort before/after every
    // stored RFC3339 value
    let from = from.map(to_db_time).unwrap_or_else(|| "0000".to_string());
    let to = to.map(to_db_time).unwrap_or_else(|| "9999".to_string());

    let rows = sqlx::query(
        r#"
        SELECT guid, user_guid, ts, bpm, label, tag, created_at
        FROM readings
        WHERE user_guid = ? AND ts >= ? AND ts <= ?
        ORDER BY ts ASC
        LIMIT ?
        "#,
    )
    .bind(user_guid.to_string())
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(db)
    .await?;

    rows.iter().map(read_row).collect()
}

/// Most recent reading by sample timestamp, if any
pub async fn latest(db: &SqlitePool, user_guid: Uuid) -> Result<Option<StoredReading>> {
    let row = sqlx::query(
        r#"
        SELECT guid, user_guid, ts, bpm, label, tag, created_at
        FROM readings
        WHERE user_guid = ?
        ORDER BY ts DESC
        LIMIT 1
        "#,
    )
    .bind(user_guid.to_string())
    .fetch_optional(db)
    .await?;

    row.as_ref().map(read_row).transpose()
}

fn read_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredReading> {
    let ts: String = row.get("ts");
    let created_at: String = row.get("created_at");
    let guid: String = row.get("guid");
    let user_guid: String = row.get("user_guid");
    let tag: String = row.get("tag");

    Ok(StoredReading {
        guid: parse_guid(&guid)?,
        user_guid: parse_guid(&user_guid)?,
        ts: from_db_time(&ts)?,
        bpm: row.get("bpm"),
        label: row.get("label"),
        tag: tag.parse()?,
        created_at: from_db_time(&created_at)?,
    })
}
