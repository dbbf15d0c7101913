//! Response contract shapes emitted by the detection service over time.
//!
//! No version field is guaranteed on the wire, so the shape is decided
//! structurally, once, by [`classify`]. Precedence is fixed:
//! legacy `has_botrytis` > `disease_label` > detections list.

use crate::schema::RawResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod detections;
pub mod disease_label;
pub mod legacy;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContractShape {
    /// `{has_botrytis, confidence}` from the original `/predict` endpoint.
    Legacy,
    /// `{found_flower, disease_label, disease_confidence}` from the two-stage `/analyze`.
    DiseaseLabel,
    /// `{status, total_detections, detections[]}`, the current contract.
    Detections,
}

impl ContractShape {
    /// Keys whose presence identifies this shape.
    pub fn marker_fields(self) -> &'static [&'static str] {
        match self {
            ContractShape::Legacy => legacy::FIELDS,
            ContractShape::DiseaseLabel => disease_label::FIELDS,
            ContractShape::Detections => detections::FIELDS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContractShape::Legacy => "legacy",
            ContractShape::DiseaseLabel => "disease_label",
            ContractShape::Detections => "detections",
        }
    }

    fn matches(self, raw: &RawResponse<'_>) -> bool {
        self.marker_fields().iter().any(|key| raw.has(key))
    }
}

impl std::fmt::Display for ContractShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shapes in the order they are tried.
pub const PRECEDENCE: [ContractShape; 3] = [
    ContractShape::Legacy,
    ContractShape::DiseaseLabel,
    ContractShape::Detections,
];

/// Pick the contract shape for a response.
///
/// Returns the detections shape when nothing matches, since that path
/// tolerates every field being absent.
pub fn classify(raw: &RawResponse<'_>) -> ContractShape {
    PRECEDENCE
        .into_iter()
        .find(|shape| shape.matches(raw))
        .unwrap_or(ContractShape::Detections)
}

/// Whether the response carries any field of any known shape.
pub fn is_recognized(raw: &RawResponse<'_>) -> bool {
    PRECEDENCE.into_iter().any(|shape| shape.matches(raw))
}
