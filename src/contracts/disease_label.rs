use crate::schema::{NormalizedResult, RawResponse};

pub const FIELDS: &[&str] = &["disease_label", "disease_confidence"];

/// Label the classifier reports for an infected crop.
pub const DEFAULT_DISEASE_LABEL: &str = "botrytis";

/// Reduce a two-stage (flower detector + disease classifier) response.
///
/// `disease_label` must equal `infected_label` exactly.
pub fn reduce(raw: &RawResponse<'_>, infected_label: &str) -> NormalizedResult {
    NormalizedResult {
        has_botrytis: raw.str_field("disease_label") == Some(infected_label),
        confidence: raw.confidence_field("disease_confidence"),
        found_flower: raw.bool_field("found_flower"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(v: serde_json::Value) -> NormalizedResult {
        reduce(&RawResponse::new(&v), DEFAULT_DISEASE_LABEL)
    }

    #[test]
    fn infected_crop() {
        assert_eq!(
            run(json!({"disease_label": "botrytis", "disease_confidence": 0.83, "found_flower": true})),
            NormalizedResult {
                has_botrytis: true,
                confidence: 0.83,
                found_flower: Some(true),
            }
        );
    }

    #[test]
    fn healthy_crop() {
        let r = run(json!({"disease_label": "healthy", "disease_confidence": 0.7, "found_flower": true}));
        assert!(!r.has_botrytis);
        assert_eq!(r.confidence, 0.7);
    }

    #[test]
    fn label_match_is_exact() {
        let r = run(json!({"disease_label": "Botrytis", "disease_confidence": 0.9}));
        assert!(!r.has_botrytis);
        let r = run(json!({"disease_label": "botrytis_rose", "disease_confidence": 0.9}));
        assert!(!r.has_botrytis);
    }

    #[test]
    fn no_flower_response() {
        let r = run(json!({
            "found_flower": false,
            "flower_confidence": 0.0,
            "disease_label": null,
            "disease_confidence": null,
            "message": "No flower detected in the image."
        }));
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
    fn detector_unavailable_leaves_flower_unknown() {
        let r = run(json!({"found_flower": null, "disease_label": "botrytis", "disease_confidence": 0.6}));
        assert_eq!(r.found_flower, None);
        assert!(r.has_botrytis);
    }

    #[test]
    fn custom_label() {
        let v = json!({"disease_label": "gray_mold", "disease_confidence": 0.5});
        assert!(reduce(&RawResponse::new(&v), "gray_mold").has_botrytis);
    }
}
