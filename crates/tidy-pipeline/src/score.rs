//! Quality scoring and duration estimation over annotation results.

use tidy_models::VideoAnnotations;

/// Score annotation richness into [0.0, 1.0].
///
/// Additive with per-component caps: labels up to 30 points (3 each),
/// high-confidence labels (> 0.8) up to 10 (2 each), objects up to 30
/// (3 each), text up to 10 (2 each), shots up to 10 (1 each), divided by
/// 100. The caps sum to 90, so a perfect clip scores 0.9; the headroom is
/// intentional and the result is never rescaled.
pub fn quality_score(annotations: &VideoAnnotations) -> f64 {
    let mut score = 0usize;

    score += (annotations.labels.len() * 3).min(30);

    let high_conf = annotations
        .labels
        .iter()
        .filter(|label| label.confidence > 0.8)
        .count();
    score += (high_conf * 2).min(10);

    score += (annotations.objects.len() * 3).min(30);
    score += (annotations.text.len() * 2).min(10);
    score += annotations.shots.len().min(10);

    score as f64 / 100.0
}

/// Estimate clip duration in whole seconds from annotation timestamps.
///
/// Takes the maximum end time over shot segments and label segments, rounded
/// up. Returns `None` when no segment carries timing, which is not the same
/// as a zero-length clip.
pub fn estimate_duration(annotations: &VideoAnnotations) -> Option<i64> {
    let mut max_time = 0.0f64;

    for shot in &annotations.shots {
        if shot.end_time > max_time {
            max_time = shot.end_time;
        }
    }

    for label in &annotations.labels {
        for segment in &label.segments {
            if segment.end_time > max_time {
                max_time = segment.end_time;
            }
        }
    }

    if max_time > 0.0 {
        Some(max_time.ceil() as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidy_models::{LabelAnnotation, ObjectAnnotation, TextAnnotation, TimeSegment};

    fn label(confidence: f64, end_time: f64) -> LabelAnnotation {
        LabelAnnotation {
            description: "stove".to_string(),
            confidence,
            segments: vec![TimeSegment {
                start_time: 0.0,
                end_time,
            }],
        }
    }

    fn object() -> ObjectAnnotation {
        ObjectAnnotation {
            description: "sink".to_string(),
            confidence: 0.9,
            track_id: 0,
            frames: Vec::new(),
        }
    }

    fn text() -> TextAnnotation {
        TextAnnotation {
            text: "bleach".to_string(),
            confidence: 0.9,
            segments: Vec::new(),
        }
    }

    fn shot(end_time: f64) -> TimeSegment {
        TimeSegment {
            start_time: 0.0,
            end_time,
        }
    }

    #[test]
    fn test_empty_annotations_score_zero() {
        assert_eq!(quality_score(&VideoAnnotations::empty()), 0.0);
    }

    #[test]
    fn test_worked_example() {
        // 5 labels (15) + 2 high-conf (4) + 3 objects (9) + 1 text (2) +
        // 4 shots (4) = 34 points
        let mut annotations = VideoAnnotations::empty();
        annotations.labels = vec![
            label(0.9, 3.0),
            label(0.85, 3.0),
            label(0.5, 3.0),
            label(0.5, 3.0),
            label(0.5, 3.0),
        ];
        annotations.objects = vec![object(), object(), object()];
        annotations.text = vec![text()];
        annotations.shots = vec![shot(1.0), shot(2.0), shot(3.0), shot(4.0)];

        assert!((quality_score(&annotations) - 0.34).abs() < 1e-9);
    }

    #[test]
    fn test_component_caps() {
        // Way past every cap: 30 + 10 + 30 + 10 + 10 = 90
        let mut annotations = VideoAnnotations::empty();
        annotations.labels = (0..50).map(|_| label(0.95, 1.0)).collect();
        annotations.objects = (0..50).map(|_| object()).collect();
        annotations.text = (0..50).map(|_| text()).collect();
        annotations.shots = (0..50).map(|i| shot(i as f64)).collect();

        assert!((quality_score(&annotations) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_strictly_above_threshold() {
        let mut annotations = VideoAnnotations::empty();
        annotations.labels = vec![label(0.8, 1.0)];
        // 3 for the label, no high-confidence bonus at exactly 0.8
        assert!((quality_score(&annotations) - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_score_non_decreasing_in_each_count() {
        let mut annotations = VideoAnnotations::empty();
        annotations.labels = vec![label(0.5, 1.0)];
        let base = quality_score(&annotations);

        annotations.objects.push(object());
        let with_object = quality_score(&annotations);
        assert!(with_object >= base);

        annotations.text.push(text());
        let with_text = quality_score(&annotations);
        assert!(with_text >= with_object);

        annotations.shots.push(shot(1.0));
        assert!(quality_score(&annotations) >= with_text);
    }

    #[test]
    fn test_duration_from_shots_and_labels() {
        let mut annotations = VideoAnnotations::empty();
        annotations.shots = vec![shot(4.2)];
        annotations.labels = vec![label(0.9, 7.6)];
        assert_eq!(estimate_duration(&annotations), Some(8));
    }

    #[test]
    fn test_duration_none_without_timing() {
        assert_eq!(estimate_duration(&VideoAnnotations::empty()), None);

        let mut annotations = VideoAnnotations::empty();
        annotations.shots = vec![shot(0.0)];
        assert_eq!(estimate_duration(&annotations), None);
    }
}
