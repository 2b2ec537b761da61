//! Normalized video annotation models.
//!
//! The annotation provider returns deeply nested, mostly-optional response
//! shapes. These types are the canonical form the rest of the pipeline works
//! with: all times in seconds, missing collections as empty vecs, confidence
//! already folded to the per-entry maximum.
//!
//! Field names serialize in camelCase so stored payloads match what the
//! curation UI already consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A start/end time range within the clip, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeSegment {
    pub start_time: f64,
    pub end_time: f64,
}

/// A whole-segment label (e.g. "kitchen", "washing").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnnotation {
    pub description: String,
    /// Maximum confidence observed across the label's segments
    pub confidence: f64,
    #[serde(default)]
    pub segments: Vec<TimeSegment>,
}

/// Normalized bounding box, each coordinate in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// One tracked-object observation at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFrame {
    /// Offset into the clip, in seconds
    pub time: f64,
    pub bounding_box: BoundingBox,
}

/// A tracked object (e.g. "vacuum", "sink") with its per-frame boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAnnotation {
    pub description: String,
    pub confidence: f64,
    pub track_id: i64,
    #[serde(default)]
    pub frames: Vec<ObjectFrame>,
}

/// Detected on-screen text (product labels, signage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub text: String,
    /// Maximum confidence observed across the detection's segments
    pub confidence: f64,
    #[serde(default)]
    pub segments: Vec<TimeSegment>,
}

/// The full normalized annotation result for one clip.
///
/// Owned exclusively by the media record that produced it; never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnnotations {
    #[serde(default)]
    pub labels: Vec<LabelAnnotation>,
    #[serde(default)]
    pub objects: Vec<ObjectAnnotation>,
    #[serde(default)]
    pub text: Vec<TextAnnotation>,
    #[serde(default)]
    pub shots: Vec<TimeSegment>,
    pub processed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

impl VideoAnnotations {
    /// An annotation result with no detections, stamped now.
    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            objects: Vec::new(),
            text: Vec::new(),
            shots: Vec::new(),
            processed_at: Utc::now(),
            processing_time_ms: 0,
        }
    }

    /// Lower-cased label descriptions, in annotation order.
    pub fn label_descriptions(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.description.to_lowercase())
            .collect()
    }

    /// Lower-cased object descriptions, in annotation order.
    pub fn object_descriptions(&self) -> Vec<String> {
        self.objects
            .iter()
            .map(|o| o.description.to_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_annotations() {
        let a = VideoAnnotations::empty();
        assert!(a.labels.is_empty());
        assert!(a.shots.is_empty());
        assert_eq!(a.processing_time_ms, 0);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let a = VideoAnnotations {
            shots: vec![TimeSegment {
                start_time: 0.0,
                end_time: 2.5,
            }],
            ..VideoAnnotations::empty()
        };
        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("processedAt").is_some());
        assert_eq!(json["shots"][0]["endTime"], 2.5);
    }

    #[test]
    fn test_descriptions_are_lowercased() {
        let a = VideoAnnotations {
            labels: vec![LabelAnnotation {
                description: "Kitchen".into(),
                confidence: 0.9,
                segments: vec![],
            }],
            ..VideoAnnotations::empty()
        };
        assert_eq!(a.label_descriptions(), vec!["kitchen".to_string()]);
    }
}
