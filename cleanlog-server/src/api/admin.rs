//! Admin dashboard read

use super::Envelope;
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use cleanlog_common::db::AdminSnapshot;

/// GET /api/admin/cleanings
///
/// Entire contents of both tables, newest first. No pagination.
pub async fn admin_snapshot(
    State(state): State<AppState>,
) -> Result<Json<Envelope<AdminSnapshot>>, ApiError> {
    let snapshot = state.store.admin_snapshot().await?;
    Ok(Envelope::ok(snapshot))
}
