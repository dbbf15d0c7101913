use crate::schema::{NormalizedResult, RawResponse};

pub const FIELDS: &[&str] = &["has_botrytis"];

/// Pass the legacy record through. Nothing is recomputed.
pub fn reduce(raw: &RawResponse<'_>) -> NormalizedResult {
    NormalizedResult {
        has_botrytis: raw.bool_field("has_botrytis").unwrap_or(false),
        confidence: raw.confidence_field("confidence"),
        found_flower: raw.bool_field("found_flower"),
    }
}
