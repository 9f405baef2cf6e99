//! Shift-end event queries

use super::RecordStore;
use chrono::Utc;
use cleanlog_common::db::ShiftEndEvent;
use cleanlog_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Message returned when a shift-end arrives without a cleaner name
pub const CLEANER_NAME_REQUIRED: &str = "Cleaner name is required.";

impl RecordStore {
    /// Record that `cleaner_name` finished their shift
    ///
    /// Rejects an absent, empty or whitespace-only name with
    /// [`Error::Validation`] without touching the table.
    pub async fn create_shift_end(&self, cleaner_name: Option<&str>) -> Result<ShiftEndEvent> {
        let cleaner_name = cleaner_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Validation(CLEANER_NAME_REQUIRED.to_string()))?;

        let row = sqlx::query(
            "INSERT INTO shift_ends (cleaner_name, ended_at) VALUES (?, ?) \
             RETURNING id, cleaner_name, ended_at",
        )
        .bind(cleaner_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        shift_end_from_row(&row)
    }

    /// All shift-end events, newest first
    pub async fn list_shift_ends(&self) -> Result<Vec<ShiftEndEvent>> {
        let rows = sqlx::query("SELECT id, cleaner_name, ended_at FROM shift_ends ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(shift_end_from_row).collect()
    }
}

fn shift_end_from_row(row: &SqliteRow) -> Result<ShiftEndEvent> {
    Ok(ShiftEndEvent {
        id: row.try_get("id")?,
        cleaner_name: row.try_get::<Option<String>, _>("cleaner_name")?.unwrap_or_default(),
        ended_at: row.try_get("ended_at")?,
    })
}
