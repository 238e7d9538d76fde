//! API error type with JSON responses the upload page understands.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::Error;

/// Body of every error response: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upload exceeds {max_mb}MB")]
    PayloadTooLarge { max_mb: usize },
    #[error("PDF processing failed")]
    ProcessingFailed,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
            ApiError::PayloadTooLarge { max_mb } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File too large, maximum size is {max_mb}MB"),
            ),
            ApiError::ProcessingFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PDF processing failed".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::FileNotFound(path) => {
                ApiError::NotFound(format!("File not found: {}", path.display()))
            }
            Error::InvalidPattern { .. } | Error::EmptyPattern => {
                ApiError::BadRequest(err.to_string())
            }
            Error::Pdf(_) | Error::EmptyPdf(_) | Error::EmptyFile(_) => {
                ApiError::BadRequest(format!("Could not read PDF: {err}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
