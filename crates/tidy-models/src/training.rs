//! Training-corpus models.

use serde::{Deserialize, Serialize};

use crate::media::{MediaId, MediaRecord};

/// Anonymized, curator-approved corpus entry.
///
/// Anonymization is a hard contract: this record must never carry fields
/// that identify the originating property, location, or organization. The
/// source media id exists only so approval is an idempotent upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingVideoRecord {
    pub source_media_id: MediaId,
    pub video_url: String,
    pub room_type: Option<String>,
    pub action_types: Vec<String>,
    pub object_labels: Vec<String>,
    /// Curator-assigned technique tags; empty at approval time
    pub technique_tags: Vec<String>,
    pub duration_seconds: Option<i64>,
    pub quality_score: f64,
    pub is_featured: bool,
}

impl TrainingVideoRecord {
    /// Build the anonymized projection of a completed media record.
    ///
    /// Only AI-derived fields cross over; everything else stays behind.
    pub fn from_completed(record: &MediaRecord, video_url: impl Into<String>) -> Self {
        Self {
            source_media_id: record.media_id.clone(),
            video_url: video_url.into(),
            room_type: record.ai_room_type.clone(),
            action_types: record.ai_action_types.clone(),
            object_labels: record.ai_object_labels.clone(),
            technique_tags: Vec::new(),
            duration_seconds: record.ai_duration,
            quality_score: record.ai_quality_score.unwrap_or(0.0),
            is_featured: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_defaults() {
        let mut media = MediaRecord::new(MediaId::from_string("m-9"), "gs://b/v.mp4");
        media.ai_room_type = Some("kitchen".into());
        media.ai_action_types = vec!["cleaning".into()];
        media.ai_quality_score = Some(0.42);

        let corpus = TrainingVideoRecord::from_completed(&media, "gs://b/v.mp4");
        assert_eq!(corpus.source_media_id, media.media_id);
        assert_eq!(corpus.room_type.as_deref(), Some("kitchen"));
        assert!(corpus.technique_tags.is_empty());
        assert!(!corpus.is_featured);
        assert_eq!(corpus.quality_score, 0.42);
    }

    #[test]
    fn test_missing_quality_score_defaults_to_zero() {
        let media = MediaRecord::new(MediaId::new(), "gs://b/v.mp4");
        let corpus = TrainingVideoRecord::from_completed(&media, "gs://b/v.mp4");
        assert_eq!(corpus.quality_score, 0.0);
    }
}
