//! Record Store
//!
//! Owns the lifecycle of cleaning records and shift-end events. Rows are only
//! ever inserted and read; ids come from SQLite AUTOINCREMENT and are never
//! reused, so "newest first" is `ORDER BY id DESC` everywhere.

mod cleanings;
mod report;
mod shift_ends;

use cleanlog_common::db::AdminSnapshot;
use cleanlog_common::Result;
use sqlx::SqlitePool;

/// Handle to the persisted tables; cheap to clone
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Both tables in full, newest first, for the admin dashboard
    pub async fn admin_snapshot(&self) -> Result<AdminSnapshot> {
        let cleanings = self.list_cleaning_records().await?;
        let shift_ends = self.list_shift_ends().await?;
        Ok(AdminSnapshot { cleanings, shift_ends })
    }

    /// Database clock as RFC 3339 (UTC); doubles as a connectivity check
    pub async fn server_time(&self) -> Result<String> {
        let now: String = sqlx::query_scalar("SELECT strftime('%Y-%m-%dT%H:%M:%fZ', 'now')")
            .fetch_one(&self.pool)
            .await?;
        Ok(now)
    }
}
