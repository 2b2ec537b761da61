//! Raw Video Intelligence REST shapes and their normalization.
//!
//! Everything the API returns is optional at every level of nesting. The
//! types here mirror the wire format faithfully; `normalize` flattens them
//! into the canonical model with empty collections instead of nulls.

use chrono::Utc;
use serde::Deserialize;

use tidy_models::{
    BoundingBox, LabelAnnotation, ObjectAnnotation, ObjectFrame, TextAnnotation, TimeSegment,
    VideoAnnotations,
};

/// Response to the initial `videos:annotate` POST.
#[derive(Debug, Deserialize)]
pub(crate) struct AnnotateOperation {
    pub name: String,
}

/// A long-running operation, polled until `done`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Operation {
    #[serde(default)]
    pub done: bool,
    pub error: Option<OperationStatus>,
    pub response: Option<AnnotateResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationStatus {
    pub code: Option<i32>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    pub annotation_results: Vec<RawAnnotationResults>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAnnotationResults {
    #[serde(default)]
    pub segment_label_annotations: Vec<RawLabelAnnotation>,
    #[serde(default)]
    pub object_annotations: Vec<RawObjectAnnotation>,
    #[serde(default)]
    pub text_annotations: Vec<RawTextAnnotation>,
    #[serde(default)]
    pub shot_annotations: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntity {
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLabelAnnotation {
    pub entity: Option<RawEntity>,
    #[serde(default)]
    pub segments: Vec<RawScoredSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawScoredSegment {
    pub segment: Option<RawSegment>,
    pub confidence: Option<f64>,
}

/// Protobuf durations arrive as strings like `"12.500s"`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSegment {
    pub start_time_offset: Option<String>,
    pub end_time_offset: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawObjectAnnotation {
    pub entity: Option<RawEntity>,
    pub confidence: Option<f64>,
    pub track_id: Option<StringOrInt>,
    #[serde(default)]
    pub frames: Vec<RawObjectFrame>,
}

/// Proto int64 fields serialize as JSON strings, but tolerate numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StringOrInt {
    String(String),
    Int(i64),
}

impl StringOrInt {
    fn as_i64(&self) -> i64 {
        match self {
            StringOrInt::String(s) => s.parse().unwrap_or(0),
            StringOrInt::Int(n) => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawObjectFrame {
    pub normalized_bounding_box: Option<RawBoundingBox>,
    pub time_offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBoundingBox {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTextAnnotation {
    pub text: Option<String>,
    #[serde(default)]
    pub segments: Vec<RawScoredSegment>,
}

/// Parse a protobuf JSON duration (`"3.500s"`) into seconds.
///
/// Missing or malformed offsets normalize to 0 rather than failing the
/// whole annotation.
pub(crate) fn parse_offset(offset: Option<&str>) -> f64 {
    offset
        .map(|s| s.trim_end_matches('s'))
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn segment(raw: Option<&RawSegment>) -> TimeSegment {
    match raw {
        Some(s) => TimeSegment {
            start_time: parse_offset(s.start_time_offset.as_deref()),
            end_time: parse_offset(s.end_time_offset.as_deref()),
        },
        None => TimeSegment::default(),
    }
}

/// Flatten one raw annotation result into the canonical model.
///
/// Entries without a description/text are dropped; label and text confidence
/// is the maximum over their segments.
pub(crate) fn normalize(raw: RawAnnotationResults) -> VideoAnnotations {
    let mut annotations = VideoAnnotations {
        labels: Vec::new(),
        objects: Vec::new(),
        text: Vec::new(),
        shots: Vec::new(),
        processed_at: Utc::now(),
        processing_time_ms: 0,
    };

    for label in raw.segment_label_annotations {
        let Some(description) = label.entity.and_then(|e| e.description) else {
            continue;
        };
        let confidence = label
            .segments
            .iter()
            .filter_map(|s| s.confidence)
            .fold(0.0, f64::max);
        let segments = label
            .segments
            .iter()
            .map(|s| segment(s.segment.as_ref()))
            .collect();
        annotations.labels.push(LabelAnnotation {
            description,
            confidence,
            segments,
        });
    }

    for object in raw.object_annotations {
        let Some(description) = object.entity.and_then(|e| e.description) else {
            continue;
        };
        let frames = object
            .frames
            .iter()
            .map(|f| {
                let raw_box = f.normalized_bounding_box.as_ref();
                ObjectFrame {
                    time: parse_offset(f.time_offset.as_deref()),
                    bounding_box: BoundingBox {
                        left: raw_box.and_then(|b| b.left).unwrap_or(0.0),
                        top: raw_box.and_then(|b| b.top).unwrap_or(0.0),
                        right: raw_box.and_then(|b| b.right).unwrap_or(0.0),
                        bottom: raw_box.and_then(|b| b.bottom).unwrap_or(0.0),
                    },
                }
            })
            .collect();
        annotations.objects.push(ObjectAnnotation {
            description,
            confidence: object.confidence.unwrap_or(0.0),
            track_id: object.track_id.as_ref().map(StringOrInt::as_i64).unwrap_or(0),
            frames,
        });
    }

    for text in raw.text_annotations {
        let Some(content) = text.text else {
            continue;
        };
        let confidence = text
            .segments
            .iter()
            .filter_map(|s| s.confidence)
            .fold(0.0, f64::max);
        let segments = text
            .segments
            .iter()
            .map(|s| segment(s.segment.as_ref()))
            .collect();
        annotations.text.push(TextAnnotation {
            text: content,
            confidence,
            segments,
        });
    }

    for shot in raw.shot_annotations {
        annotations.shots.push(TimeSegment {
            start_time: parse_offset(shot.start_time_offset.as_deref()),
            end_time: parse_offset(shot.end_time_offset.as_deref()),
        });
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_formats() {
        assert_eq!(parse_offset(Some("3.500s")), 3.5);
        assert_eq!(parse_offset(Some("12s")), 12.0);
        assert_eq!(parse_offset(Some("0s")), 0.0);
        assert_eq!(parse_offset(Some("garbage")), 0.0);
        assert_eq!(parse_offset(None), 0.0);
    }

    #[test]
    fn test_normalize_takes_max_segment_confidence() {
        let raw: RawAnnotationResults = serde_json::from_value(serde_json::json!({
            "segmentLabelAnnotations": [{
                "entity": {"description": "kitchen"},
                "segments": [
                    {"segment": {"startTimeOffset": "0s", "endTimeOffset": "2s"}, "confidence": 0.4},
                    {"segment": {"startTimeOffset": "2s", "endTimeOffset": "5.5s"}, "confidence": 0.9}
                ]
            }]
        }))
        .unwrap();

        let annotations = normalize(raw);
        assert_eq!(annotations.labels.len(), 1);
        assert_eq!(annotations.labels[0].confidence, 0.9);
        assert_eq!(annotations.labels[0].segments[1].end_time, 5.5);
    }

    #[test]
    fn test_normalize_drops_entries_without_description() {
        let raw: RawAnnotationResults = serde_json::from_value(serde_json::json!({
            "segmentLabelAnnotations": [{"segments": [{"confidence": 0.8}]}],
            "textAnnotations": [{"segments": []}]
        }))
        .unwrap();

        let annotations = normalize(raw);
        assert!(annotations.labels.is_empty());
        assert!(annotations.text.is_empty());
    }

    #[test]
    fn test_normalize_object_track_id_string_or_int() {
        let raw: RawAnnotationResults = serde_json::from_value(serde_json::json!({
            "objectAnnotations": [
                {"entity": {"description": "sink"}, "confidence": 0.7, "trackId": "12", "frames": []},
                {"entity": {"description": "mop"}, "confidence": 0.6, "trackId": 3,
                 "frames": [{"timeOffset": "1.250s",
                             "normalizedBoundingBox": {"left": 0.1, "top": 0.2, "right": 0.8, "bottom": 0.9}}]}
            ]
        }))
        .unwrap();

        let annotations = normalize(raw);
        assert_eq!(annotations.objects[0].track_id, 12);
        assert_eq!(annotations.objects[1].track_id, 3);
        assert_eq!(annotations.objects[1].frames[0].time, 1.25);
        assert_eq!(annotations.objects[1].frames[0].bounding_box.right, 0.8);
    }

    #[test]
    fn test_normalize_missing_collections_become_empty() {
        let raw: RawAnnotationResults = serde_json::from_value(serde_json::json!({})).unwrap();
        let annotations = normalize(raw);
        assert!(annotations.labels.is_empty());
        assert!(annotations.objects.is_empty());
        assert!(annotations.text.is_empty());
        assert!(annotations.shots.is_empty());
    }
}
