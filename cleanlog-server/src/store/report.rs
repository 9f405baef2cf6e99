//! Aggregation behind the daily report

use super::RecordStore;
use cleanlog_common::db::CleanerCount;
use cleanlog_common::Result;

impl RecordStore {
    /// Records per cleaner whose `cleaning_date` equals `date` (`YYYY-MM-DD`)
    ///
    /// Ordered by cleaner name so the report reads the same every run.
    pub async fn daily_counts(&self, date: &str) -> Result<Vec<CleanerCount>> {
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            r#"
            SELECT cleaner_name, COUNT(*) AS flats
            FROM cleanings
            WHERE cleaning_date = ?
            GROUP BY cleaner_name
            ORDER BY cleaner_name
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(cleaner_name, flats)| CleanerCount {
                cleaner_name: cleaner_name.unwrap_or_default(),
                flats,
            })
            .collect())
    }
}
