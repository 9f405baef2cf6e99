//! Database initialization
//!
//! Opens (creating if necessary) the SQLite database named by a
//! `sqlite://` URL and brings both tables up to the declared schema.
//! Any failure here is fatal to the server.

use crate::db::table_schemas::sync_all_table_schemas;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Connection pool size for file-backed databases
const MAX_CONNECTIONS: u32 = 10;

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the database at `database_url` and create/upgrade tables
///
/// `sqlite::memory:` is supported for tests; such a pool holds exactly one
/// connection that is never recycled, since each SQLite in-memory
/// connection is its own database.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| Error::Config(format!("Invalid database URL '{}': {}", database_url, e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?
    };

    info!("Opened database: {}", database_url);

    sync_all_table_schemas(&pool).await?;

    Ok(pool)
}
