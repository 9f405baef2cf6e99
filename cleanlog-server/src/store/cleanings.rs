//! Cleaning record queries

use super::RecordStore;
use chrono::{DateTime, Utc};
use cleanlog_common::db::{CleaningRecord, NewCleaningRecord, DEFAULT_CLEANING_REQUEST};
use cleanlog_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, warn};

const SELECT_COLUMNS: &str = r#"
    id, cleaner_name, block, apartment_number, status, notes,
    cleaning_date, cleaning_time, tenant_not_home, tenant_signed,
    tenant_signature, cleaning_request, photos, created_at,
    has_problem, problem_note, problem_photo
"#;

impl RecordStore {
    /// Insert a cleaning record and return the persisted row
    pub async fn create_cleaning_record(&self, new: &NewCleaningRecord) -> Result<CleaningRecord> {
        let photos = serde_json::to_string(&new.photos)?;
        let created_at = Utc::now();

        let sql = format!(
            r#"
            INSERT INTO cleanings
                (cleaner_name, block, apartment_number, status, notes,
                 cleaning_date, cleaning_time, tenant_not_home, tenant_signed,
                 tenant_signature, cleaning_request, photos, created_at,
                 has_problem, problem_note, problem_photo)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&new.cleaner_name)
            .bind(&new.block)
            .bind(&new.apartment_number)
            .bind(&new.status)
            .bind(&new.notes)
            .bind(&new.cleaning_date)
            .bind(&new.cleaning_time)
            .bind(new.tenant_not_home)
            .bind(new.tenant_signed)
            .bind(&new.tenant_signature)
            .bind(&new.cleaning_request)
            .bind(photos)
            .bind(created_at)
            .bind(new.has_problem)
            .bind(&new.problem_note)
            .bind(&new.problem_photo)
            .fetch_one(&self.pool)
            .await?;

        let record = cleaning_from_row(&row)?;
        debug!("Inserted cleaning record {}", record.id);
        Ok(record)
    }

    /// All cleaning records, newest first
    pub async fn list_cleaning_records(&self) -> Result<Vec<CleaningRecord>> {
        let sql = format!("SELECT {} FROM cleanings ORDER BY id DESC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(cleaning_from_row).collect()
    }
}

/// Map a `cleanings` row, reading NULLs from rows older than a column as its default
fn cleaning_from_row(row: &SqliteRow) -> Result<CleaningRecord> {
    let text = |column: &str| -> Result<String> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };
    let flag = |column: &str| -> Result<bool> {
        Ok(row.try_get::<Option<bool>, _>(column)?.unwrap_or(false))
    };

    let id: i64 = row.try_get("id")?;

    let photos = match row.try_get::<Option<String>, _>("photos")? {
        Some(json) if !json.is_empty() => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Cleaning record {} has unreadable photos column: {}", id, e);
            Vec::new()
        }),
        _ => Vec::new(),
    };

    let cleaning_request = match text("cleaning_request")? {
        request if request.is_empty() => DEFAULT_CLEANING_REQUEST.to_string(),
        request => request,
    };

    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(CleaningRecord {
        id,
        cleaner_name: text("cleaner_name")?,
        block: text("block")?,
        apartment_number: text("apartment_number")?,
        status: text("status")?,
        notes: text("notes")?,
        cleaning_date: text("cleaning_date")?,
        cleaning_time: text("cleaning_time")?,
        tenant_not_home: flag("tenant_not_home")?,
        tenant_signed: flag("tenant_signed")?,
        tenant_signature: text("tenant_signature")?,
        cleaning_request,
        photos,
        has_problem: flag("has_problem")?,
        problem_note: text("problem_note")?,
        problem_photo: row.try_get("problem_photo")?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanlog_common::db::init_database;

    async fn setup_store() -> RecordStore {
        RecordStore::new(init_database("sqlite::memory:").await.unwrap())
    }

    fn submission(cleaner: &str, apartment: &str) -> NewCleaningRecord {
        NewCleaningRecord {
            cleaner_name: cleaner.to_string(),
            block: "B".to_string(),
            apartment_number: apartment.to_string(),
            status: "done".to_string(),
            cleaning_date: "2024-06-01".to_string(),
            cleaning_time: "10:30".to_string(),
            ..NewCleaningRecord::default()
        }
    }

    #[tokio::test]
    async fn test_create_returns_full_row() {
        let store = setup_store().await;
        let before = Utc::now();

        let mut new = submission("Ali", "12");
        new.photos = vec!["/uploads/1-1.jpg".to_string(), "/uploads/1-2.png".to_string()];
        new.tenant_signed = true;
        new.tenant_signature = "data:image/png;base64,AAAA".to_string();

        let record = store.create_cleaning_record(&new).await.unwrap();

        assert!(record.id > 0);
        assert_eq!(record.cleaner_name, "Ali");
        assert_eq!(record.apartment_number, "12");
        assert_eq!(record.photos, new.photos);
        assert!(record.tenant_signed);
        assert!(!record.tenant_not_home);
        assert_eq!(record.cleaning_request, "requested");
        assert_eq!(record.problem_photo, None);
        assert!(record.created_at >= before);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = setup_store().await;

        let mut last = 0;
        for apartment in ["1", "2", "3"] {
            let record = store.create_cleaning_record(&submission("Ali", apartment)).await.unwrap();
            assert!(record.id > last);
            last = record.id;
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = setup_store().await;

        let first = store.create_cleaning_record(&submission("Ali", "1")).await.unwrap();
        let second = store.create_cleaning_record(&submission("Veli", "2")).await.unwrap();

        let records = store.list_cleaning_records().await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_problem_report_round_trip() {
        let store = setup_store().await;

        let mut new = submission("Ali", "7");
        new.has_problem = true;
        new.problem_note = "Broken tap".to_string();
        new.problem_photo = Some("/uploads/9-9.jpg".to_string());

        store.create_cleaning_record(&new).await.unwrap();
        let listed = store.list_cleaning_records().await.unwrap();

        assert!(listed[0].has_problem);
        assert_eq!(listed[0].problem_note, "Broken tap");
        assert_eq!(listed[0].problem_photo.as_deref(), Some("/uploads/9-9.jpg"));
    }

    #[tokio::test]
    async fn test_rows_with_nulls_read_as_defaults() {
        let store = setup_store().await;

        // Row shaped like one written before the problem columns existed
        sqlx::query(
            "INSERT INTO cleanings (cleaner_name, notes, photos, cleaning_request, has_problem, problem_note) \
             VALUES ('Old', NULL, NULL, NULL, NULL, NULL)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let records = store.list_cleaning_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cleaner_name, "Old");
        assert_eq!(records[0].notes, "");
        assert!(records[0].photos.is_empty());
        assert_eq!(records[0].cleaning_request, "requested");
        assert!(!records[0].has_problem);
    }
}
