//! Media record models.
//!
//! A `MediaRecord` is the per-clip source of truth: where the video lives,
//! how far the AI pipeline has taken it, and whether a curator has promoted
//! it into the training corpus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::annotation::VideoAnnotations;

/// Unique identifier for an uploaded media clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub String);

impl MediaId {
    /// Generate a new random media ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MediaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// AI processing status of a media record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    /// Uploaded, not yet processed
    #[default]
    Pending,
    /// A worker is annotating the clip
    Processing,
    /// Annotations and derived fields are present
    Completed,
    /// Processing failed; `ai_error` holds the reason
    Failed,
}

impl AiStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AiStatus::Pending => "pending",
            AiStatus::Processing => "processing",
            AiStatus::Completed => "completed",
            AiStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AiStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AiStatus::Pending),
            "processing" => Ok(AiStatus::Processing),
            "completed" => Ok(AiStatus::Completed),
            "failed" => Ok(AiStatus::Failed),
            other => Err(format!("unknown ai status: {other}")),
        }
    }
}

/// Curation status of a completed media record.
///
/// Only meaningful once `ai_status` is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Awaiting curator review
    #[default]
    Pending,
    /// Promoted into the training corpus
    Approved,
    /// Explicitly kept out of the training corpus
    Rejected,
}

impl TrainingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Pending => "pending",
            TrainingStatus::Approved => "approved",
            TrainingStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TrainingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TrainingStatus::Pending),
            "approved" => Ok(TrainingStatus::Approved),
            "rejected" => Ok(TrainingStatus::Rejected),
            other => Err(format!("unknown training status: {other}")),
        }
    }
}

/// One uploaded clip and everything the pipeline has derived from it.
///
/// AI fields are mutated only by the pipeline orchestrator; the training
/// fields only by the curation actions. The record itself is never deleted
/// by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Unique media identifier
    pub media_id: MediaId,
    /// Blob reference: HTTPS URL or `gs://` URI
    pub video_url: Option<String>,
    /// AI lifecycle status
    pub ai_status: AiStatus,
    /// Full normalized annotation payload (present when completed)
    pub ai_annotations: Option<VideoAnnotations>,
    /// Failure reason (present when failed)
    pub ai_error: Option<String>,
    /// When processing last started
    pub ai_processing_started: Option<DateTime<Utc>>,
    /// When processing completed
    pub ai_processed_at: Option<DateTime<Utc>>,
    /// When processing last failed
    pub ai_failed_at: Option<DateTime<Utc>>,
    /// Single best room-type tag, if any keyword scored
    pub ai_room_type: Option<String>,
    /// Action-type tags (zero or more)
    pub ai_action_types: Vec<String>,
    /// Filtered, deduplicated object labels, capped at 30
    pub ai_object_labels: Vec<String>,
    /// Annotation-richness score in [0.0, 1.0]
    pub ai_quality_score: Option<f64>,
    /// Estimated clip duration in whole seconds
    pub ai_duration: Option<i64>,
    /// Diagnostic: object label count before filtering
    pub ai_raw_label_count: Option<i32>,
    /// Diagnostic: object label count after filtering
    pub ai_filtered_label_count: Option<i32>,
    /// Curation status (set once processing completes)
    pub training_status: Option<TrainingStatus>,
    /// When a curator approved the clip
    pub training_approved_at: Option<DateTime<Utc>>,
    /// When a curator rejected the clip
    pub training_rejected_at: Option<DateTime<Utc>>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Create a fresh record for a newly uploaded clip.
    pub fn new(media_id: MediaId, video_url: impl Into<String>) -> Self {
        Self {
            media_id,
            video_url: Some(video_url.into()),
            ai_status: AiStatus::Pending,
            ai_annotations: None,
            ai_error: None,
            ai_processing_started: None,
            ai_processed_at: None,
            ai_failed_at: None,
            ai_room_type: None,
            ai_action_types: Vec::new(),
            ai_object_labels: Vec::new(),
            ai_quality_score: None,
            ai_duration: None,
            ai_raw_label_count: None,
            ai_filtered_label_count: None,
            training_status: None,
            training_approved_at: None,
            training_rejected_at: None,
            created_at: Utc::now(),
        }
    }

    /// True once annotations and derived fields are present.
    pub fn is_processed(&self) -> bool {
        self.ai_status == AiStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_id_roundtrip() {
        let id = MediaId::from_string("clip-123");
        assert_eq!(id.as_str(), "clip-123");
        assert_eq!(id.to_string(), "clip-123");
    }

    #[test]
    fn test_ai_status_parse() {
        assert_eq!("processing".parse::<AiStatus>(), Ok(AiStatus::Processing));
        assert!("bogus".parse::<AiStatus>().is_err());
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = MediaRecord::new(MediaId::new(), "https://example.com/v.mp4");
        assert_eq!(record.ai_status, AiStatus::Pending);
        assert!(record.training_status.is_none());
        assert!(!record.is_processed());
    }

    #[test]
    fn test_training_status_serde_snake_case() {
        let json = serde_json::to_string(&TrainingStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }
}
