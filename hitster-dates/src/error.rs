//! Error types for hitster-dates

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Reconciliation error
///
/// Source failures never surface here; they only shrink the opinion set.
#[derive(Debug, Error)]
pub enum DatesError {
    /// Neither the platform nor any source produced a year
    #[error("No release year found for query: {0}")]
    NoOpinions(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, DatesError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Dates(#[from] DatesError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Dates(ref err @ DatesError::NoOpinions(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "NO_RELEASE_YEAR", err.to_string())
            }
            ApiError::Dates(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATES_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
