//! Request handlers for queue management and curation.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use tidy_models::{MediaId, QueueStats};
use tidy_pipeline::BatchOutcome;

use crate::error::ApiResult;
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize, Default)]
pub struct EnqueueRequest {
    #[serde(default)]
    pub priority: i32,
}

#[derive(Serialize)]
pub struct EnqueueResponse {
    pub success: bool,
    pub media_id: String,
}

/// Queue a video for processing.
pub async fn enqueue_video(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    request: Option<Json<EnqueueRequest>>,
) -> ApiResult<Json<EnqueueResponse>> {
    let media_id = MediaId::from_string(media_id);
    let priority = request.map(|Json(r)| r.priority).unwrap_or(0);

    state.pipeline.queue_video(&media_id, priority).await?;

    Ok(Json(EnqueueResponse {
        success: true,
        media_id: media_id.to_string(),
    }))
}

/// Queue and curation statistics.
pub async fn get_queue_stats(State(state): State<AppState>) -> ApiResult<Json<QueueStats>> {
    let stats = state.pipeline.queue_stats().await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize, Default)]
pub struct ProcessRequest {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_batch_size() -> u32 {
    5
}

/// Run a processing batch synchronously.
///
/// Intended for operator-triggered runs; the worker binary covers the
/// steady-state schedule.
pub async fn process_batch(
    State(state): State<AppState>,
    request: Option<Json<ProcessRequest>>,
) -> ApiResult<Json<BatchOutcome>> {
    let batch_size = request.map(|Json(r)| r.batch_size).unwrap_or(5);
    info!(batch_size, "processing batch via API");

    let outcome = state.pipeline.process_batch(batch_size).await?;
    Ok(Json(outcome))
}

#[derive(Serialize)]
pub struct RetryResponse {
    pub success: bool,
    pub requeued: u64,
}

/// Return all failed queue items to the pool.
pub async fn retry_failed(State(state): State<AppState>) -> ApiResult<Json<RetryResponse>> {
    let requeued = state.pipeline.retry_failed().await?;
    Ok(Json(RetryResponse {
        success: true,
        requeued,
    }))
}

#[derive(Serialize)]
pub struct CurationResponse {
    pub success: bool,
    pub media_id: String,
    pub training_status: String,
}

/// Approve a processed clip into the training corpus.
pub async fn approve_training(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<CurationResponse>> {
    let media_id = MediaId::from_string(media_id);
    state.corpus.approve(&media_id).await?;

    Ok(Json(CurationResponse {
        success: true,
        media_id: media_id.to_string(),
        training_status: "approved".to_string(),
    }))
}

/// Reject a clip, removing it from the training corpus if present.
pub async fn reject_training(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<CurationResponse>> {
    let media_id = MediaId::from_string(media_id);
    state.corpus.reject(&media_id).await?;

    Ok(Json(CurationResponse {
        success: true,
        media_id: media_id.to_string(),
        training_status: "rejected".to_string(),
    }))
}
