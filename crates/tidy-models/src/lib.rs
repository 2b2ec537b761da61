//! Shared data models for the Tidy video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Media records and their AI lifecycle fields
//! - Normalized video annotations (labels, objects, text, shots)
//! - Processing-queue items and aggregate stats
//! - Anonymized training-corpus records

pub mod annotation;
pub mod media;
pub mod queue;
pub mod training;

// Re-export common types
pub use annotation::{
    BoundingBox, LabelAnnotation, ObjectAnnotation, ObjectFrame, TextAnnotation, TimeSegment,
    VideoAnnotations,
};
pub use media::{AiStatus, MediaId, MediaRecord, TrainingStatus};
pub use queue::{QueueItem, QueueStats, QueueStatus};
pub use training::TrainingVideoRecord;
