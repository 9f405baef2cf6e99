//! Once-a-day trigger for the report

use super::{send_daily_report, MailTransport, ReportOutcome};
use crate::store::RecordStore;
use chrono::{Local, NaiveTime};
use cleanlog_common::time::{next_occurrence, today_local};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Run the daily report every day at local wall-clock `at`
///
/// Failures are logged and the loop carries on to the next day.
pub fn spawn_daily_report(
    store: RecordStore,
    mailer: Arc<dyn MailTransport>,
    recipient: String,
    at: NaiveTime,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = next_occurrence(&now, at);
            let wait = (next - now).to_std().unwrap_or_default();
            info!("Next daily report at {}", next.format("%Y-%m-%d %H:%M"));
            tokio::time::sleep(wait).await;

            let date = today_local();
            match send_daily_report(&store, mailer.as_ref(), &recipient, &date).await {
                Ok(ReportOutcome::Sent { cleaners, flats }) => {
                    info!("Daily report for {} sent: {} cleaners, {} flats", date, cleaners, flats);
                }
                Ok(ReportOutcome::Skipped) => {}
                Err(e) => error!("Daily report for {} failed: {}", date, e),
            }
        }
    })
}
