//! cleanlog-server library
//!
//! REST API for cleaning records and shift-end events, photo uploads,
//! WebSocket update notifications and the daily email report.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use cleanlog_common::EventBus;
use std::path::PathBuf;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod report;
pub mod store;
pub mod uploads;

use store::RecordStore;
use uploads::{UploadStore, UPLOADS_URL_PREFIX};

/// Request body ceiling (JSON, forms and multipart uploads)
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Buffered record-mutation events per WebSocket subscriber
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub uploads: UploadStore,
    pub events: EventBus,
    /// Static pages served for any path no route claims
    pub public_dir: PathBuf,
    /// Interval between WebSocket update messages
    pub ws_interval: Duration,
}

impl AppState {
    pub fn new(
        store: RecordStore,
        uploads: UploadStore,
        events: EventBus,
        public_dir: PathBuf,
        ws_interval: Duration,
    ) -> Self {
        Self {
            store,
            uploads,
            events,
            public_dir,
            ws_interval,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let uploads = ServeDir::new(state.uploads.dir());
    let public = ServeDir::new(&state.public_dir).append_index_html_on_directories(false);

    Router::new()
        .route("/", get(api::root))
        .route("/ws", get(api::ws_handler))
        .route(
            "/api/cleanings",
            get(api::list_cleanings).post(api::create_cleaning),
        )
        .route(
            "/api/job-finished",
            get(api::list_shift_ends).post(api::finish_job),
        )
        .route("/api/admin/cleanings", get(api::admin_snapshot))
        .merge(api::health_routes())
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .fallback_service(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
