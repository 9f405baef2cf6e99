//! Daily cleaning report
//!
//! Counts today's records per cleaner and mails a plain-text summary.
//! Days without records send nothing.

mod mailer;
mod scheduler;

pub use mailer::{Email, MailTransport, SmtpMailer};
pub use scheduler::spawn_daily_report;

use crate::store::RecordStore;
use cleanlog_common::db::CleanerCount;
use cleanlog_common::Result;
use tracing::info;

/// What a report run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// No records for the date; nothing was sent
    Skipped,
    Sent { cleaners: usize, flats: i64 },
}

/// Compose the report email, or None when there is nothing to report
pub fn build_report_email(date: &str, recipient: &str, counts: &[CleanerCount]) -> Option<Email> {
    if counts.is_empty() {
        return None;
    }

    let total: i64 = counts.iter().map(|c| c.flats).sum();
    let mut body = format!("Cleaning summary for {}\n\n", date);
    for count in counts {
        let name = if count.cleaner_name.is_empty() {
            "(unnamed)"
        } else {
            count.cleaner_name.as_str()
        };
        body.push_str(&format!("{}: {} flats\n", name, count.flats));
    }
    body.push_str(&format!("\nTotal: {} flats\n", total));

    Some(Email {
        to: recipient.to_string(),
        subject: format!("Daily cleaning report - {}", date),
        body,
    })
}

/// Aggregate `date` and send the summary through `mailer`
pub async fn send_daily_report(
    store: &RecordStore,
    mailer: &dyn MailTransport,
    recipient: &str,
    date: &str,
) -> Result<ReportOutcome> {
    let counts = store.daily_counts(date).await?;

    let Some(email) = build_report_email(date, recipient, &counts) else {
        info!("No cleaning records for {}, daily report skipped", date);
        return Ok(ReportOutcome::Skipped);
    };

    mailer.send(&email).await?;

    Ok(ReportOutcome::Sent {
        cleaners: counts.len(),
        flats: counts.iter().map(|c| c.flats).sum(),
    })
}
