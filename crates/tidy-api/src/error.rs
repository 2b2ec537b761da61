//! API error types.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use tidy_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Record once, at startup, whether internal error details are hidden from
/// responses. Subsequent calls are no-ops.
pub fn init_error_rendering(production: bool) {
    let _ = PRODUCTION.set(production);
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Store(#[from] tidy_store::StoreError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Don't expose internal error details in production.
    fn detail(&self, production: bool) -> String {
        match self {
            ApiError::Internal(_) | ApiError::Store(_) if production => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::MissingMedia(id) => Self::NotFound(format!("media {id} not found")),
            PipelineError::NotProcessed(id) => {
                Self::Conflict(format!("video {id} has not been processed yet"))
            }
            PipelineError::MissingVideoUrl(id) => {
                Self::Conflict(format!("media {id} has no video url"))
            }
            PipelineError::Store(err) => Self::Store(err),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let production = PRODUCTION.get().copied().unwrap_or(false);
        let detail = self.detail(production);

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_hidden_in_production() {
        let err = ApiError::internal("pool exhausted at 10.0.0.3");
        assert_eq!(err.detail(true), "An internal error occurred");
        assert!(err.detail(false).contains("pool exhausted"));
    }

    #[test]
    fn test_client_errors_always_carry_detail() {
        let err = ApiError::bad_request("priority must be an integer");
        assert!(err.detail(true).contains("priority must be an integer"));

        let err = ApiError::not_found("media m-1 not found");
        assert!(err.detail(true).contains("m-1"));
    }
}
