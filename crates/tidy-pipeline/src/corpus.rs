//! Curation actions: approve or reject a processed clip.
//!
//! Approval is the only path into the training corpus. The corpus entry is
//! an anonymized projection of the media record: derived tags and score,
//! never the annotation payload or any identity linkage beyond the upsert
//! key.

use sqlx::PgPool;
use tracing::info;

use tidy_models::{MediaId, TrainingStatus, TrainingVideoRecord};
use tidy_store::{MediaRepo, TrainingRepo};

use crate::error::{PipelineError, PipelineResult};

/// Approval-gated gateway to the training corpus.
#[derive(Clone)]
pub struct TrainingCorpus {
    pool: PgPool,
}

impl TrainingCorpus {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Promote a completed clip into the training corpus.
    ///
    /// Fails with a "not yet processed" error, mutating nothing, unless the
    /// record exists and has completed annotation. Re-approval upserts the
    /// same corpus row, refreshing derived fields while preserving curator
    /// edits.
    pub async fn approve(&self, media_id: &MediaId) -> PipelineResult<()> {
        let record = MediaRepo::get(&self.pool, media_id)
            .await?
            .ok_or_else(|| PipelineError::missing_media(media_id))?;

        if !record.is_processed() {
            return Err(PipelineError::not_processed(media_id));
        }
        let video_url = record
            .video_url
            .clone()
            .ok_or_else(|| PipelineError::missing_video_url(media_id))?;

        let entry = TrainingVideoRecord::from_completed(&record, video_url);
        TrainingRepo::upsert(&self.pool, &entry).await?;
        MediaRepo::set_training_status(&self.pool, media_id, TrainingStatus::Approved).await?;

        info!(media_id = %media_id, "approved for training corpus");
        Ok(())
    }

    /// Reject a clip, removing any prior corpus entry.
    ///
    /// The media record must exist; rejecting an unknown id is an error.
    /// Otherwise idempotent: rejecting a clip that was never approved just
    /// records the decision.
    pub async fn reject(&self, media_id: &MediaId) -> PipelineResult<()> {
        if MediaRepo::get(&self.pool, media_id).await?.is_none() {
            return Err(PipelineError::missing_media(media_id));
        }

        MediaRepo::set_training_status(&self.pool, media_id, TrainingStatus::Rejected).await?;
        TrainingRepo::delete(&self.pool, media_id).await?;

        info!(media_id = %media_id, "rejected from training corpus");
        Ok(())
    }
}
