use crate::contracts::ContractShape;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical record handed to presentation, whatever contract produced it.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq)]
pub struct NormalizedResult {
    /// True iff the image is judged infected.
    pub has_botrytis: bool,
    /// Confidence in the reported verdict, in `[0, 1]`.
    pub confidence: f64,
    /// Whether a flower was located at all; `None` when the contract cannot say.
    pub found_flower: Option<bool>,
}

impl NormalizedResult {
    pub fn verdict(&self) -> Verdict {
        Verdict::from(self)
    }
}

impl Default for NormalizedResult {
    fn default() -> Self {
        Self {
            has_botrytis: false,
            confidence: 0.0,
            found_flower: None,
        }
    }
}

/// Three-state diagnosis shown to the user.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Infected,
    Healthy,
    NoFlowerDetected,
}

impl From<&NormalizedResult> for Verdict {
    fn from(result: &NormalizedResult) -> Self {
        // An explicit "no flower" outranks the infection flag; unknown never does.
        if result.found_flower == Some(false) {
            Verdict::NoFlowerDetected
        } else if result.has_botrytis {
            Verdict::Infected
        } else {
            Verdict::Healthy
        }
    }
}

/// Aggregates collected while walking a detections list.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Default)]
pub struct DetectionSummary {
    pub detections: usize,
    pub infected: usize,
    pub max_infected_confidence: f64,
    pub max_healthy_confidence: f64,
}

/// A [`NormalizedResult`] together with how it was reached.
///
/// `recognized` is false when the body carried no field of any known
/// contract; the verdict is then the fail-safe default.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub result: NormalizedResult,
    pub contract: ContractShape,
    pub recognized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DetectionSummary>,
}
