//! Cleaning record submission and listing

use super::Envelope;
use crate::error::ApiError;
use crate::form::CleaningFields;
use crate::uploads::{MAX_PHOTOS, MAX_PROBLEM_PHOTOS};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use cleanlog_common::db::CleaningRecord;
use cleanlog_common::CleanlogEvent;
use tracing::{info, warn};

/// POST /api/cleanings
///
/// Multipart form: text fields, up to 10 `photos` files and at most one
/// `problemPhoto` file. Every part is read and counted before any file is
/// written; files written for a submission that then fails are discarded.
pub async fn create_cleaning(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<CleaningRecord>>, ApiError> {
    let mut fields = CleaningFields::default();
    let mut photo_parts: Vec<(String, Bytes)> = Vec::new();
    let mut problem_parts: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            fields.insert(name, value);
            continue;
        };

        let (target, limit) = match name.as_str() {
            "photos" => (&mut photo_parts, MAX_PHOTOS),
            "problemPhoto" => (&mut problem_parts, MAX_PROBLEM_PHOTOS),
            other => {
                warn!("Ignoring unexpected file field '{}'", other);
                continue;
            }
        };

        let bytes = field.bytes().await?;
        // Browsers send an empty, unnamed part for an untouched file input
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        if target.len() >= limit {
            return Err(ApiError::Validation(format!(
                "Too many files for '{}' (maximum {}).",
                name, limit
            )));
        }

        target.push((file_name, bytes));
    }

    let mut stored: Vec<String> = Vec::with_capacity(photo_parts.len() + problem_parts.len());
    for (file_name, bytes) in photo_parts.iter().chain(&problem_parts) {
        match state.uploads.store(Some(file_name.as_str()), bytes).await {
            Ok(path) => stored.push(path),
            Err(e) => {
                state.uploads.discard(&stored).await;
                return Err(e.into());
            }
        }
    }

    let photos = stored[..photo_parts.len()].to_vec();
    let problem_photo = stored.get(photo_parts.len()).cloned();
    let new = fields.into_new_record(photos, problem_photo);

    let record = match state.store.create_cleaning_record(&new).await {
        Ok(record) => record,
        Err(e) => {
            state.uploads.discard(&stored).await;
            return Err(e.into());
        }
    };

    info!(
        "Cleaning record {} saved: {} block {} apt {} ({} photos)",
        record.id,
        record.cleaner_name,
        record.block,
        record.apartment_number,
        record.photos.len()
    );

    if record.has_problem {
        warn!(
            "Problem reported on record {} by {} at block {} apt {}: {}",
            record.id, record.cleaner_name, record.block, record.apartment_number, record.problem_note
        );
    }

    state.events.emit_lossy(CleanlogEvent::CleaningRecorded {
        id: record.id,
        cleaner_name: record.cleaner_name.clone(),
        has_problem: record.has_problem,
        timestamp: Utc::now(),
    });

    Ok(Envelope::ok(record))
}

/// GET /api/cleanings
pub async fn list_cleanings(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<CleaningRecord>>>, ApiError> {
    let records = state.store.list_cleaning_records().await?;
    Ok(Envelope::ok(records))
}
