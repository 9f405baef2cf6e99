//! Site root

use super::ws::start_session;
use crate::AppState;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::{IntoResponse, Redirect, Response},
};

/// Static login page the root redirects to
pub const LOGIN_PAGE: &str = "/login.html";

/// GET /
///
/// Browsers are sent to the login page. WebSocket clients that connect to
/// the bare host are upgraded into an update session.
pub async fn root(ws: Option<WebSocketUpgrade>, State(state): State<AppState>) -> Response {
    match ws {
        Some(ws) => start_session(ws, &state),
        None => Redirect::to(LOGIN_PAGE).into_response(),
    }
}
