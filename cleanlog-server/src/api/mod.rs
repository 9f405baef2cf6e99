//! HTTP API handlers for cleanlog-server

pub mod admin;
pub mod cleanings;
pub mod health;
pub mod shift_ends;
pub mod ui;
pub mod ws;

pub use admin::admin_snapshot;
pub use cleanings::{create_cleaning, list_cleanings};
pub use health::{db_test, health_routes};
pub use shift_ends::{finish_job, list_shift_ends};
pub use ui::root;
pub use ws::ws_handler;

use axum::Json;
use serde::Serialize;

/// Success body shared by all JSON endpoints: `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data,
        })
    }

    pub fn ok_with_message(message: &'static str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message),
            data,
        })
    }
}
