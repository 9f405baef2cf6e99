//! Health check endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
///
/// Process liveness only; does not touch the database.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "cleanlog-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/db-test
///
/// `{"ok": true, "time": {"now": ...}}` from the database clock, or HTTP 500
/// `{"ok": false, "error": ...}`. `time` is the result row, keyed by column.
pub async fn db_test(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.server_time().await {
        Ok(time) => (StatusCode::OK, Json(json!({ "ok": true, "time": { "now": time } }))),
        Err(e) => {
            error!("Database check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
        }
    }
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/db-test", get(db_test))
}
