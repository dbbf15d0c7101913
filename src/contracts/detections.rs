use crate::schema::{DetectionSummary, NormalizedResult, RawDetection, RawResponse};
use regex::Regex;

pub const FIELDS: &[&str] = &["status", "total_detections", "detections"];

pub const STATUS_INFECTED: &str = "infected";
pub const STATUS_NO_FLOWER: &str = "no_flower_detected";

/// Whether a single detection counts as infected.
///
/// The explicit flag decides when present; otherwise the label is matched
/// against `marker`.
pub fn is_infected(detection: &RawDetection<'_>, marker: &Regex) -> bool {
    match detection.is_infected() {
        Some(flag) => flag,
        None => marker.is_match(detection.label()),
    }
}

/// Reduce a per-region detections response.
pub fn reduce(raw: &RawResponse<'_>, marker: &Regex) -> (NormalizedResult, DetectionSummary) {
    let detections = raw.detections();
    let status = raw.str_field("status");

    // A no-flower status wins over a nonzero count.
    let found_flower = status != Some(STATUS_NO_FLOWER)
        && (raw.number_field("total_detections") > 0.0 || !detections.is_empty());

    let mut summary = DetectionSummary {
        detections: detections.len(),
        ..DetectionSummary::default()
    };

    for detection in &detections {
        let confidence = detection.confidence();
        if is_infected(detection, marker) {
            summary.infected += 1;
            summary.max_infected_confidence = summary.max_infected_confidence.max(confidence);
        } else {
            summary.max_healthy_confidence = summary.max_healthy_confidence.max(confidence);
        }
    }

    let has_botrytis = summary.infected > 0 || status == Some(STATUS_INFECTED);

    // Confidence always refers to the verdict being reported.
    let confidence = if has_botrytis {
        summary.max_infected_confidence
    } else if found_flower {
        summary.max_healthy_confidence
    } else {
        0.0
    };

    let result = NormalizedResult {
        has_botrytis,
        confidence,
        found_flower: Some(found_flower),
    };
    (result, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn marker() -> Regex {
        regex::RegexBuilder::new("botrytis")
            .case_insensitive(true)
            .build()
            .unwrap()
    }

    fn run(v: serde_json::Value) -> NormalizedResult {
        reduce(&RawResponse::new(&v), &marker()).0
    }

    #[test]
    fn infected_confidence_wins_even_when_lower() {
        let r = run(json!({
            "status": "infected",
            "total_detections": 2,
            "detections": [
                {"label": "healthy_rose", "confidence": 0.9, "is_infected": false},
                {"label": "botrytis_rose", "confidence": 0.6, "is_infected": true}
            ]
        }));
        assert_eq!(
            r,
            NormalizedResult {
                has_botrytis: true,
                confidence: 0.6,
                found_flower: Some(true),
            }
        );
    }

    #[test]
    fn explicit_no_flower() {
        let r = run(json!({"status": "no_flower_detected", "total_detections": 0, "detections": []}));
        assert_eq!(
            r,
            NormalizedResult {
                has_botrytis: false,
                confidence: 0.0,
                found_flower: Some(false),
            }
        );
    }

    #[test]
    fn no_flower_status_overrides_detections() {
        let r = run(json!({
            "status": "no_flower_detected",
            "total_detections": 1,
            "detections": [{"label": "healthy_rose", "confidence": 0.8}]
        }));
        assert_eq!(r.found_flower, Some(false));
        assert!(!r.has_botrytis);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn label_inference_is_case_insensitive() {
        let r = run(json!({
            "detections": [{"label": "Botrytis_Cinerea", "confidence": 0.55}]
        }));
        assert!(r.has_botrytis);
        assert_eq!(r.confidence, 0.55);
        assert_eq!(r.found_flower, Some(true));
    }

    #[test]
    fn explicit_false_flag_beats_label() {
        let r = run(json!({
            "detections": [{"label": "botrytis_rose", "confidence": 0.7, "is_infected": false}]
        }));
        assert!(!r.has_botrytis);
        assert_eq!(r.confidence, 0.7);
    }

    #[test]
    fn explicit_true_flag_without_marker_label() {
        let r = run(json!({
            "detections": [{"label": "rose", "confidence": 0.4, "is_infected": true}]
        }));
        assert!(r.has_botrytis);
        assert_eq!(r.confidence, 0.4);
    }

    #[test]
    fn healthy_reports_best_healthy_confidence() {
        let r = run(json!({
            "status": "healthy",
            "total_detections": 2,
            "detections": [
                {"label": "healthy_rose", "confidence": 0.65, "is_infected": false},
                {"label": "healthy_rose", "confidence": 0.92, "is_infected": false}
            ]
        }));
        assert!(!r.has_botrytis);
        assert_eq!(r.confidence, 0.92);
        assert_eq!(r.found_flower, Some(true));
    }

    #[test]
    fn status_fallback_without_infected_detections() {
        let r = run(json!({"status": "infected", "total_detections": 1}));
        assert!(r.has_botrytis);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.found_flower, Some(true));
    }

    #[test]
    fn count_without_list_means_flower_found() {
        let r = run(json!({"status": "healthy", "total_detections": "3"}));
        assert_eq!(r.found_flower, Some(true));
        assert!(!r.has_botrytis);
    }

    #[test]
    fn list_without_count_means_flower_found() {
        let r = run(json!({"detections": [{"label": "healthy_rose", "confidence": 0.3}]}));
        assert_eq!(r.found_flower, Some(true));
        assert_eq!(r.confidence, 0.3);
    }

    #[test]
    fn malformed_confidence_does_not_reject_detection() {
        let (r, summary) = reduce(
            &RawResponse::new(&json!({
                "detections": [
                    {"label": "botrytis_rose", "confidence": "n/a"},
                    {"label": "botrytis_rose"},
                    {"label": "healthy_rose", "confidence": null}
                ]
            })),
            &marker(),
        );
        assert!(r.has_botrytis);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(summary.detections, 3);
        assert_eq!(summary.infected, 2);
    }

    #[test]
    fn non_iterable_detections_degrade_to_empty() {
        let r = run(json!({"status": "healthy", "detections": 5}));
        assert_eq!(
            r,
            NormalizedResult {
                has_botrytis: false,
                confidence: 0.0,
                found_flower: Some(false),
            }
        );
    }

    #[test]
    fn empty_object_defaults() {
        let r = run(json!({}));
        assert_eq!(
            r,
            NormalizedResult {
                has_botrytis: false,
                confidence: 0.0,
                found_flower: Some(false),
            }
        );
    }

    #[test]
    fn summary_tracks_both_maxima() {
        let (_, summary) = reduce(
            &RawResponse::new(&json!({
                "detections": [
                    {"label": "healthy_rose", "confidence": 0.9},
                    {"label": "botrytis_rose", "confidence": 0.6},
                    {"label": "BOTRYTIS", "confidence": 0.75}
                ]
            })),
            &marker(),
        );
        assert_eq!(
            summary,
            DetectionSummary {
                detections: 3,
                infected: 2,
                max_infected_confidence: 0.75,
                max_healthy_confidence: 0.9,
            }
        );
    }
}
