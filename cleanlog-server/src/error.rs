//! HTTP error mapping
//!
//! Every failure reaches the client as `{"success": false, "error": "..."}`.
//! Status codes:
//! - validation failures: 200
//! - malformed requests (bad JSON, broken multipart, oversized body): 4xx
//! - storage, persistence and internal failures: 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Expected, user-correctable input problem
    #[error("{0}")]
    Validation(String),

    /// Request body could not be parsed
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },

    /// Upload could not be written
    #[error("{0}")]
    Storage(String),

    /// Database query failed
    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::OK,
            ApiError::BadRequest { status, .. } => *status,
            ApiError::Storage(_) | ApiError::Persistence(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<cleanlog_common::Error> for ApiError {
    fn from(e: cleanlog_common::Error) -> Self {
        use cleanlog_common::Error;
        match e {
            Error::Validation(msg) => ApiError::Validation(msg),
            Error::Storage(msg) => ApiError::Storage(msg),
            Error::Database(db) => ApiError::Persistence(db.to_string()),
            Error::Io(io) => ApiError::Storage(io.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        ApiError::bad_request(e.status(), e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Validation(msg) => warn!("Rejected request: {}", msg),
            ApiError::BadRequest { message, .. } => warn!("Malformed request ({}): {}", status, message),
            ApiError::Storage(msg) => error!("Storage failure: {}", msg),
            ApiError::Persistence(msg) => error!("Database failure: {}", msg),
            ApiError::Internal(msg) => error!("Internal failure: {}", msg),
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::OK);
        assert_eq!(
            ApiError::bad_request(StatusCode::PAYLOAD_TOO_LARGE, "too big").status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::Storage("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Persistence("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_common_error_conversion() {
        let validation: ApiError = cleanlog_common::Error::Validation("Cleaner name is required.".into()).into();
        assert!(matches!(validation, ApiError::Validation(ref m) if m == "Cleaner name is required."));

        let storage: ApiError = cleanlog_common::Error::Storage("disk full".into()).into();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let db: ApiError = cleanlog_common::Error::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(db, ApiError::Persistence(_)));
    }
}
