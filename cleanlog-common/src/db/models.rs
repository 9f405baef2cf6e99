//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted cleaning report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningRecord {
    pub id: i64,
    pub cleaner_name: String,
    pub block: String,
    pub apartment_number: String,
    pub status: String,
    pub notes: String,
    pub cleaning_date: String,
    pub cleaning_time: String,
    pub tenant_not_home: bool,
    pub tenant_signed: bool,
    pub tenant_signature: String,
    pub cleaning_request: String,
    /// Public `/uploads/...` paths in upload order
    pub photos: Vec<String>,
    pub has_problem: bool,
    pub problem_note: String,
    pub problem_photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a cleaning record before the store assigns `id` and `created_at`
#[derive(Debug, Clone, PartialEq)]
pub struct NewCleaningRecord {
    pub cleaner_name: String,
    pub block: String,
    pub apartment_number: String,
    pub status: String,
    pub notes: String,
    pub cleaning_date: String,
    pub cleaning_time: String,
    pub tenant_not_home: bool,
    pub tenant_signed: bool,
    pub tenant_signature: String,
    pub cleaning_request: String,
    pub photos: Vec<String>,
    pub has_problem: bool,
    pub problem_note: String,
    pub problem_photo: Option<String>,
}

/// Default category for a cleaning record
pub const DEFAULT_CLEANING_REQUEST: &str = "requested";

impl Default for NewCleaningRecord {
    fn default() -> Self {
        Self {
            cleaner_name: String::new(),
            block: String::new(),
            apartment_number: String::new(),
            status: String::new(),
            notes: String::new(),
            cleaning_date: String::new(),
            cleaning_time: String::new(),
            tenant_not_home: false,
            tenant_signed: false,
            tenant_signature: String::new(),
            cleaning_request: DEFAULT_CLEANING_REQUEST.to_string(),
            photos: Vec::new(),
            has_problem: false,
            problem_note: String::new(),
            problem_photo: None,
        }
    }
}

/// Marker that a cleaner finished their shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftEndEvent {
    pub id: i64,
    pub cleaner_name: String,
    pub ended_at: DateTime<Utc>,
}

/// Combined read for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    pub cleanings: Vec<CleaningRecord>,
    pub shift_ends: Vec<ShiftEndEvent>,
}

/// Number of records one cleaner submitted for a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanerCount {
    pub cleaner_name: String,
    pub flats: i64,
}
