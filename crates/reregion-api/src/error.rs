//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Domain errors map to 404, 400 or 500 by their [`ErrorKind`]; parameter
//! problems and ambiguous names are 400. Internal error details are logged and never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reregion_core::{ErrorKind, RegionError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Every parameter problem of a rejected request, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Requested entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// One or more query parameters are missing or malformed (400).
    #[error("{}", .0.join(" "))]
    BadRequest(Vec<String>),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    pub fn bad_request(problem: impl Into<String>) -> Self {
        Self::BadRequest(vec![problem.into()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let details = match &self {
            Self::BadRequest(problems) => Some(serde_json::json!(problems)),
            _ => None,
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::BadRequest(_) => tracing::warn!(error = %self, "bad request parameters"),
            Self::NotFound(_) => tracing::warn!(error = %self, "entity not found"),
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegionError> for AppError {
    fn from(err: RegionError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::Ambiguous => Self::BadRequest(vec![err.to_string()]),
            ErrorKind::Internal => Self::Internal(err.to_string()),
        }
    }
}
