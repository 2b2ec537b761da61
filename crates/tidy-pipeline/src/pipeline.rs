//! Pipeline orchestration: claim, annotate, derive, persist.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, warn};

use tidy_annotate::{Feature, VideoAnnotator};
use tidy_models::{MediaId, QueueStats, VideoAnnotations};
use tidy_store::{AiCompletion, MediaRepo, QueueRepo};

use crate::classify::{classify_action_types, classify_room_type};
use crate::error::{PipelineError, PipelineResult};
use crate::filter::filter_relevant_labels;
use crate::score::{estimate_duration, quality_score};

/// Features requested for every annotation run.
const REQUESTED_FEATURES: &[Feature] = &[Feature::Label, Feature::Object, Feature::Text];

/// Cap on stored object labels per clip.
const MAX_OBJECT_LABELS: usize = 30;

/// Outcome of a single queue-driven processing attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub processed: bool,
    pub media_id: MediaId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub processed: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

/// Drives clips from the queue through annotation to a completed record.
///
/// Cloning is cheap; the pool and annotator are shared handles.
#[derive(Clone)]
pub struct VideoPipeline {
    pool: PgPool,
    annotator: Arc<dyn VideoAnnotator>,
}

impl VideoPipeline {
    pub fn new(pool: PgPool, annotator: Arc<dyn VideoAnnotator>) -> Self {
        Self { pool, annotator }
    }

    /// Enqueue a clip for processing (idempotent upsert).
    pub async fn queue_video(&self, media_id: &MediaId, priority: i32) -> PipelineResult<()> {
        QueueRepo::enqueue(&self.pool, media_id, priority).await?;
        info!(media_id = %media_id, priority, "queued video for processing");
        Ok(())
    }

    /// Claim and process the next queued clip, if any.
    ///
    /// Returns `Ok(None)` when the queue has nothing claimable. Any failure
    /// while processing a claimed item marks the queue row failed and is
    /// reported in the outcome rather than bubbling up, so one bad clip
    /// never stops a batch.
    pub async fn process_next(&self) -> PipelineResult<Option<ProcessOutcome>> {
        let Some(item) = QueueRepo::claim_next(&self.pool).await? else {
            return Ok(None);
        };

        let media_id = item.media_id.clone();
        info!(media_id = %media_id, attempt = item.attempts, "claimed queue item");

        match self.run_one(&media_id).await {
            Ok(()) => {
                QueueRepo::mark_completed(&self.pool, &media_id).await?;
                Ok(Some(ProcessOutcome {
                    processed: true,
                    media_id,
                    error: None,
                }))
            }
            Err(err) => {
                let message = err.to_string();
                error!(media_id = %media_id, error = %message, "processing failed");
                QueueRepo::mark_failed(&self.pool, &media_id, &message).await?;
                Ok(Some(ProcessOutcome {
                    processed: false,
                    media_id,
                    error: Some(message),
                }))
            }
        }
    }

    /// Process up to `batch_size` queued clips, stopping early when the
    /// queue drains.
    pub async fn process_batch(&self, batch_size: u32) -> PipelineResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for _ in 0..batch_size {
            match self.process_next().await? {
                None => break,
                Some(result) if result.processed => outcome.processed += 1,
                Some(result) => {
                    outcome.failed += 1;
                    if let Some(error) = result.error {
                        outcome
                            .errors
                            .push(format!("{}: {}", result.media_id, error));
                    }
                }
            }
        }

        info!(
            processed = outcome.processed,
            failed = outcome.failed,
            "batch complete"
        );
        Ok(outcome)
    }

    /// Return all failed queue items to the pool.
    pub async fn retry_failed(&self) -> PipelineResult<u64> {
        let count = QueueRepo::retry_failed(&self.pool).await?;
        info!(count, "reset failed queue items");
        Ok(count)
    }

    /// Combined queue and curation statistics.
    pub async fn queue_stats(&self) -> PipelineResult<QueueStats> {
        let (queued, processing, completed, failed) = QueueRepo::counts(&self.pool).await?;
        let (pending_approval, approved, rejected) =
            MediaRepo::training_counts(&self.pool).await?;
        Ok(QueueStats {
            queued,
            processing,
            completed,
            failed,
            pending_approval,
            approved,
            rejected,
        })
    }

    /// Validate the claimed item's record and run the annotation pass.
    ///
    /// Fails fast (before touching the record's AI status) when the record
    /// is missing or has no video URL.
    async fn run_one(&self, media_id: &MediaId) -> PipelineResult<()> {
        let record = MediaRepo::get(&self.pool, media_id)
            .await?
            .ok_or_else(|| PipelineError::missing_media(media_id))?;

        let video_url = record
            .video_url
            .clone()
            .ok_or_else(|| PipelineError::missing_video_url(media_id))?;

        self.process_video(media_id, &video_url).await
    }

    /// Annotate one clip and persist the derived fields.
    ///
    /// On any error after the record is marked processing, a best-effort
    /// failure write records the reason; the original error is returned
    /// either way.
    pub async fn process_video(&self, media_id: &MediaId, video_url: &str) -> PipelineResult<()> {
        MediaRepo::mark_processing(&self.pool, media_id).await?;

        match self.annotate_and_persist(media_id, video_url).await {
            Ok(()) => {
                info!(media_id = %media_id, "video processed");
                Ok(())
            }
            Err(err) => {
                if let Err(write_err) =
                    MediaRepo::mark_failed(&self.pool, media_id, &err.to_string()).await
                {
                    warn!(
                        media_id = %media_id,
                        error = %write_err,
                        "could not record processing failure"
                    );
                }
                Err(err)
            }
        }
    }

    async fn annotate_and_persist(
        &self,
        media_id: &MediaId,
        video_url: &str,
    ) -> PipelineResult<()> {
        let annotations = self
            .annotator
            .annotate(video_url, REQUESTED_FEATURES)
            .await?;

        let completion = derive_completion(annotations);
        info!(
            media_id = %media_id,
            raw = completion.raw_label_count,
            filtered = completion.filtered_label_count,
            room = completion.room_type.as_deref().unwrap_or("-"),
            score = completion.quality_score,
            "derived annotation fields"
        );

        MediaRepo::save_completion(&self.pool, media_id, &completion).await?;
        Ok(())
    }
}

/// Derive every persisted field from a normalized annotation result.
///
/// Label and object streams are filtered independently; their union feeds
/// room classification, while action tags come from the label stream alone.
/// The diagnostic counts track the object stream before and after filtering.
pub fn derive_completion(annotations: VideoAnnotations) -> AiCompletion {
    let raw_labels = annotations.label_descriptions();
    let raw_objects = annotations.object_descriptions();

    let filtered_labels = filter_relevant_labels(&raw_labels);
    let filtered_objects = dedupe(filter_relevant_labels(&raw_objects));

    let mut combined = filtered_labels.clone();
    combined.extend(filtered_objects.iter().cloned());
    let combined = dedupe(combined);

    let room_type = classify_room_type(&combined);
    let action_types = classify_action_types(&filtered_labels);
    let score = quality_score(&annotations);
    let duration = estimate_duration(&annotations);

    let raw_label_count = raw_objects.len() as i32;
    let filtered_label_count = filtered_objects.len() as i32;

    let mut object_labels = filtered_objects;
    object_labels.truncate(MAX_OBJECT_LABELS);

    AiCompletion {
        annotations,
        room_type,
        action_types,
        object_labels,
        quality_score: score,
        duration,
        raw_label_count,
        filtered_label_count,
    }
}

/// Remove duplicates preserving first-seen order.
fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidy_models::{LabelAnnotation, ObjectAnnotation, TimeSegment};

    fn label(description: &str, confidence: f64) -> LabelAnnotation {
        LabelAnnotation {
            description: description.to_string(),
            confidence,
            segments: vec![TimeSegment {
                start_time: 0.0,
                end_time: 5.0,
            }],
        }
    }

    fn object(description: &str) -> ObjectAnnotation {
        ObjectAnnotation {
            description: description.to_string(),
            confidence: 0.9,
            track_id: 1,
            frames: Vec::new(),
        }
    }

    #[test]
    fn test_derive_kitchen_scenario() {
        // Labels stove/oven/dog/kitchen: dog is dropped, kitchen wins the
        // room vote with score 3.
        let mut annotations = VideoAnnotations::empty();
        annotations.labels = vec![
            label("Stove", 0.9),
            label("Oven", 0.85),
            label("Dog", 0.95),
            label("Kitchen", 0.7),
        ];

        let completion = derive_completion(annotations);
        assert_eq!(completion.room_type.as_deref(), Some("kitchen"));
        assert!(completion.action_types.is_empty());
        // No objects in this scenario, so the diagnostic counts are zero
        assert_eq!(completion.raw_label_count, 0);
        assert_eq!(completion.filtered_label_count, 0);
    }

    #[test]
    fn test_derive_counts_track_object_stream() {
        let mut annotations = VideoAnnotations::empty();
        annotations.objects = vec![object("sink"), object("sink"), object("car")];

        let completion = derive_completion(annotations);
        // 3 raw objects; dedupe and filtering leave 1
        assert_eq!(completion.raw_label_count, 3);
        assert_eq!(completion.filtered_label_count, 1);
        assert_eq!(completion.object_labels, ["sink"]);
    }

    #[test]
    fn test_derive_actions_from_labels_only() {
        let mut annotations = VideoAnnotations::empty();
        annotations.objects = vec![object("mopping floor")];
        annotations.labels = vec![label("sink", 0.9)];

        let completion = derive_completion(annotations);
        // Object stream keywords do not produce action tags
        assert!(completion.action_types.is_empty());
    }

    #[test]
    fn test_derive_object_cap() {
        let mut annotations = VideoAnnotations::empty();
        annotations.objects = (0..40).map(|i| object(&format!("towel {i}"))).collect();

        let completion = derive_completion(annotations);
        assert_eq!(completion.object_labels.len(), 30);
        assert_eq!(completion.raw_label_count, 40);
        assert_eq!(completion.filtered_label_count, 40);
    }

    #[test]
    fn test_derive_room_uses_both_streams() {
        let mut annotations = VideoAnnotations::empty();
        annotations.labels = vec![label("toilet", 0.9)];
        annotations.objects = vec![object("bathtub"), object("shower")];

        let completion = derive_completion(annotations);
        assert_eq!(completion.room_type.as_deref(), Some("bathroom"));
    }

    #[test]
    fn test_derive_empty_annotations() {
        let completion = derive_completion(VideoAnnotations::empty());
        assert_eq!(completion.room_type, None);
        assert!(completion.action_types.is_empty());
        assert!(completion.object_labels.is_empty());
        assert_eq!(completion.quality_score, 0.0);
        assert_eq!(completion.duration, None);
    }
}
