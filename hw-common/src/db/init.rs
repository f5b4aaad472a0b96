//! Database initialization
//!
//! Creates the schema on first run and is safe to call repeatedly:
//! every statement is idempotent (`CREATE TABLE IF NOT EXISTS`,
//! `INSERT OR IGNORE` for default settings).

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Default classifier thresholds, seeded into the settings table.
///
/// Rule bands: bpm below low or above high is critical, bpm at or
/// above elevated (but not above high) is abnormal, everything else
/// is normal.
pub const DEFAULT_LOW_BPM: i64 = 45;
pub const DEFAULT_ELEVATED_BPM: i64 = 121;
pub const DEFAULT_HIGH_BPM: i64 = 150;

/// Default session lifetime: 7 days
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 10080;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer; storage-level
    // serialization of concurrent uploads happens here, not in-process
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_tables(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// In-memory database for tests: same schema, single connection
/// (each SQLite memory connection is a separate database).
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    create_tables(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_sessions_table(pool).await?;
    create_readings_table(pool).await?;
    create_contacts_table(pool).await?;
    create_alerts_table(pool).await?;
    create_settings_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (user_guid) REFERENCES users(guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_readings_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE(user_guid, ts, bpm) implements the duplicate-upload
    // policy: re-uploading the same file appends nothing
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL,
            ts TEXT NOT NULL,
            bpm INTEGER NOT NULL,
            label INTEGER,
            tag TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_guid) REFERENCES users(guid),
            UNIQUE (user_guid, ts, bpm)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_readings_user_ts ON readings(user_guid, ts)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_contacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL,
            name TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_guid) REFERENCES users(guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_alerts_table(pool: &SqlitePool) -> Result<()> {
    // recipients holds a JSON array of contact snapshots
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL,
            reading_guid TEXT NOT NULL,
            location TEXT,
            recipients TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_guid) REFERENCES users(guid),
            FOREIGN KEY (reading_guid) REFERENCES readings(guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed default settings without overwriting operator changes
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    let defaults: [(&str, String); 4] = [
        ("classify_low_bpm", DEFAULT_LOW_BPM.to_string()),
        ("classify_elevated_bpm", DEFAULT_ELEVATED_BPM.to_string()),
        ("classify_high_bpm", DEFAULT_HIGH_BPM.to_string()),
        (
            "session_ttl_minutes",
            DEFAULT_SESSION_TTL_MINUTES.to_string(),
        ),
    ];

    for (key, value) in defaults {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
    }

    Ok(())
}
