//! Error types for the processing pipeline.

use tidy_models::MediaId;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("annotation failed: {0}")]
    Annotate(#[from] tidy_annotate::AnnotateError),

    #[error("storage error: {0}")]
    Store(#[from] tidy_store::StoreError),

    #[error("media record not found: {0}")]
    MissingMedia(MediaId),

    #[error("media record has no video url: {0}")]
    MissingVideoUrl(MediaId),

    #[error("video {0} must be processed before approval")]
    NotProcessed(MediaId),
}

impl PipelineError {
    pub fn missing_media(media_id: &MediaId) -> Self {
        Self::MissingMedia(media_id.clone())
    }

    pub fn missing_video_url(media_id: &MediaId) -> Self {
        Self::MissingVideoUrl(media_id.clone())
    }

    pub fn not_processed(media_id: &MediaId) -> Self {
        Self::NotProcessed(media_id.clone())
    }
}
