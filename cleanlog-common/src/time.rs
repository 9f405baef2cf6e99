//! Local date/time helpers for the daily report

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

/// Date format stored in `cleanings.cleaning_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way cleaners submit it (`YYYY-MM-DD`)
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's local date as `YYYY-MM-DD`
pub fn today_local() -> String {
    format_date(Local::now().date_naive())
}

/// Parse a wall-clock time such as `18:00` or `18:00:30`
pub fn parse_wall_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Next instant strictly after `now` at which the local wall clock reads `at`
///
/// Skips forward a day at a time when `at` does not exist locally
/// (DST gap); ambiguous times resolve to the earlier instant.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    loop {
        if let Some(candidate) = tz.from_local_datetime(&day.and_time(at)).earliest() {
            if candidate > *now {
                return candidate;
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => return now.clone(),
        };
    }
}
