//! Database initialization tests
//!
//! Verifies schema creation, default settings seeding, and that
//! re-initialization is idempotent.

use hw_common::db::init_database;
use tempfile::TempDir;

async fn table_names(pool: &sqlx::SqlitePool) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .expect("Should list tables")
}

#[tokio::test]
async fn init_creates_all_tables() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("heartwatch.db");

    let pool = init_database(&db_path).await.expect("Should initialize database");

    let tables = table_names(&pool).await;
    for expected in ["users", "sessions", "readings", "contacts", "alerts", "settings"] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn init_seeds_default_thresholds() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("heartwatch.db");

    let pool = init_database(&db_path).await.unwrap();

    let low: String =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'classify_low_bpm'")
            .fetch_one(&pool)
            .await
            .unwrap();
    let high: String =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'classify_high_bpm'")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(low, "45");
    assert_eq!(high, "150");
}

#[tokio::test]
async fn reinit_preserves_operator_settings() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("heartwatch.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("UPDATE settings SET value = '40' WHERE key = 'classify_low_bpm'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    // Second init must not clobber the tuned value
    let pool = init_database(&db_path).await.unwrap();
    let low: String =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'classify_low_bpm'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(low, "40");
}

#[tokio::test]
async fn readings_unique_constraint_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("heartwatch.db");
    let pool = init_database(&db_path).await.unwrap();

    sqlx::query("INSERT INTO users (guid, email, password_hash, created_at) VALUES ('u1', 'a@b.c', 'x', '2024-01-01T00:00:00Z')")
        .execute(&pool)
        .await
        .unwrap();

    let insert = "INSERT INTO readings (guid, user_guid, ts, bpm, label, tag, created_at) \
                  VALUES (?, 'u1', '2024-01-01T00:00:00Z', 72, NULL, 'normal', '2024-01-01T00:00:00Z')";
    sqlx::query(insert).bind("r1").execute(&pool).await.unwrap();

    let dup = sqlx::query(insert).bind("r2").execute(&pool).await;
    assert!(dup.is_err(), "duplicate (user, ts, bpm) should violate UNIQUE");
}
