//! Annotation client error types.

use thiserror::Error;

/// Result type for annotation operations.
pub type AnnotateResult<T> = Result<T, AnnotateError>;

/// Errors that can occur while annotating a video.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Video download failed: {0}")]
    DownloadFailed(String),

    #[error("Video too large ({size_mb}MB > {limit_mb}MB limit). Could not convert to GCS URI.")]
    TooLarge { size_mb: u64, limit_mb: u64 },

    #[error("Annotation operation failed: {0}")]
    OperationFailed(String),

    #[error("No annotation results returned")]
    NoResults,

    #[error("Annotation timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnnotateError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn operation_failed(msg: impl Into<String>) -> Self {
        Self::OperationFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True for credential failures, which no amount of retrying will fix.
    pub fn is_auth(&self) -> bool {
        matches!(self, AnnotateError::AuthError(_))
    }
}
