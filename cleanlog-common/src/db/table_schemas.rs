//! Table schema definitions
//!
//! Single source of truth for the `cleanings` and `shift_ends` tables.
//! Columns appended after the first release (the problem-report trio) are
//! added to existing databases by [`SchemaSync`] on startup.

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Cleaning records table
pub struct CleaningsTableSchema;

impl TableSchema for CleaningsTableSchema {
    fn table_name() -> &'static str {
        "cleanings"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").autoincrement_key(),
            ColumnDefinition::new("cleaner_name", "TEXT"),
            ColumnDefinition::new("block", "TEXT"),
            ColumnDefinition::new("apartment_number", "TEXT"),
            ColumnDefinition::new("status", "TEXT"),
            ColumnDefinition::new("notes", "TEXT").default("''"),
            ColumnDefinition::new("cleaning_date", "TEXT"),
            ColumnDefinition::new("cleaning_time", "TEXT"),
            ColumnDefinition::new("tenant_not_home", "BOOLEAN").default("0"),
            ColumnDefinition::new("tenant_signed", "BOOLEAN").default("0"),
            ColumnDefinition::new("tenant_signature", "TEXT").default("''"),
            ColumnDefinition::new("cleaning_request", "TEXT").default("'requested'"),
            // JSON array of /uploads/ paths
            ColumnDefinition::new("photos", "TEXT").default("'[]'"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
            // Problem report columns
            ColumnDefinition::new("has_problem", "BOOLEAN").default("0"),
            ColumnDefinition::new("problem_note", "TEXT").default("''"),
            ColumnDefinition::new("problem_photo", "TEXT"),
        ]
    }
}

/// Shift-end events table
pub struct ShiftEndsTableSchema;

impl TableSchema for ShiftEndsTableSchema {
    fn table_name() -> &'static str {
        "shift_ends"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").autoincrement_key(),
            ColumnDefinition::new("cleaner_name", "TEXT"),
            ColumnDefinition::new("ended_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

/// Create or upgrade every table
pub async fn sync_all_table_schemas(pool: &SqlitePool) -> Result<()> {
    info!("Synchronizing table schemas");

    SchemaSync::sync_table::<CleaningsTableSchema>(pool).await?;
    SchemaSync::sync_table::<ShiftEndsTableSchema>(pool).await?;

    Ok(())
}
