//! Shift-end ("job finished") endpoints

use super::Envelope;
use crate::error::ApiError;
use crate::form::FormOrJson;
use crate::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use cleanlog_common::db::ShiftEndEvent;
use cleanlog_common::CleanlogEvent;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct JobFinishedRequest {
    #[serde(rename = "cleanerName", default)]
    pub cleaner_name: Option<String>,
}

/// POST /api/job-finished
///
/// A missing name is a validation failure: HTTP 200 with `success: false`.
pub async fn finish_job(
    State(state): State<AppState>,
    FormOrJson(request): FormOrJson<JobFinishedRequest>,
) -> Result<Json<Envelope<ShiftEndEvent>>, ApiError> {
    let event = state
        .store
        .create_shift_end(request.cleaner_name.as_deref())
        .await?;

    info!("Shift finished: {} (event {})", event.cleaner_name, event.id);

    state.events.emit_lossy(CleanlogEvent::ShiftEnded {
        id: event.id,
        cleaner_name: event.cleaner_name.clone(),
        timestamp: Utc::now(),
    });

    Ok(Envelope::ok_with_message("Shift marked as finished.", event))
}

/// GET /api/job-finished
pub async fn list_shift_ends(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ShiftEndEvent>>>, ApiError> {
    let events = state.store.list_shift_ends().await?;
    Ok(Envelope::ok(events))
}
