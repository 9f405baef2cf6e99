//! Integration tests for database initialization
//!
//! - Database file is created when missing
//! - Re-opening an existing database is idempotent and keeps rows
//! - Malformed URLs fail with a configuration error

use cleanlog_common::db::init_database;
use cleanlog_common::Error;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cleanlog.db");
    assert!(!db_path.exists());

    let url = format!("sqlite://{}", db_path.display());
    let pool = init_database(&url).await;

    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_reopen_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("cleanlog.db").display());

    let pool = init_database(&url).await.unwrap();
    sqlx::query("INSERT INTO shift_ends (cleaner_name) VALUES ('Fatma')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&url).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shift_ends")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_in_memory_database_has_tables() {
    let pool = init_database("sqlite::memory:").await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('cleanings', 'shift_ends') ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(tables, vec!["cleanings", "shift_ends"]);
}

#[tokio::test]
async fn test_invalid_url_is_config_error() {
    let result = init_database("sqlite://cleanlog.db?journal=fast").await;
    assert!(matches!(result, Err(Error::Config(_))));
}
