//! Settings database operations
//!
//! Get/set accessors over the settings key-value table, plus typed
//! loaders for the classifier thresholds and session TTL.

use hw_common::db::DEFAULT_SESSION_TTL_MINUTES;
use hw_common::{Error, Result};
use sqlx::SqlitePool;

use crate::ingest::Thresholds;

/// Load classifier thresholds, falling back to compiled defaults for
/// any missing key
pub async fn load_thresholds(db: &SqlitePool) -> Result<Thresholds> {
    let defaults = Thresholds::default();
    Ok(Thresholds {
        low_bpm: get_setting(db, "classify_low_bpm")
            .await?
            .unwrap_or(defaults.low_bpm),
        elevated_bpm: get_setting(db, "classify_elevated_bpm")
            .await?
            .unwrap_or(defaults.elevated_bpm),
        high_bpm: get_setting(db, "classify_high_bpm")
            .await?
            .unwrap_or(defaults.high_bpm),
    })
}

/// Persist classifier thresholds (caller validates ordering first)
pub async fn save_thresholds(db: &SqlitePool, thresholds: &Thresholds) -> Result<()> {
    set_setting(db, "classify_low_bpm", thresholds.low_bpm).await?;
    set_setting(db, "classify_elevated_bpm", thresholds.elevated_bpm).await?;
    set_setting(db, "classify_high_bpm", thresholds.high_bpm).await?;
    Ok(())
}

/// Session lifetime in minutes
pub async fn session_ttl_minutes(db: &SqlitePool) -> Result<i64> {
    Ok(get_setting(db, "session_ttl_minutes")
        .await?
        .unwrap_or(DEFAULT_SESSION_TTL_MINUTES))
}

/// Generic setting getter
pub async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Internal(format!("Invalid setting '{}': {}", key, e))),
        None => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}
