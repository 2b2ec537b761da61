//! Axum HTTP API for the video processing pipeline.
//!
//! Exposes queue management (enqueue, batch process, retry, stats) and the
//! curation actions that gate the training corpus.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
