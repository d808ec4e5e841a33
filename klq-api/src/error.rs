//! Error types for klq-api
//!
//! Route handlers never leak internal failure detail to the client: upstream
//! and sampling failures collapse to a generic 502 `fetch_failed`, validation
//! problems to 400, everything else to 500. The detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A record could not be produced: remote host down, malformed record,
    /// or sampler exhaustion (502)
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<klq_common::Error> for ApiError {
    fn from(err: klq_common::Error) -> Self {
        use klq_common::Error;
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::RemoteUnavailable(msg)
            | Error::MalformedRecord(msg)
            | Error::NoCandidateFound(msg) => ApiError::FetchFailed(msg),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::FetchFailed(detail) => {
                warn!(%detail, "Request failed upstream");
                (
                    StatusCode::BAD_GATEWAY,
                    "fetch_failed",
                    "could not produce a quiz record".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                warn!(%detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            ApiError::Other(ref err) => {
                warn!(error = %err, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
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
pub type ApiResult<T> = Result<T, ApiError>;
