use crate::config::ClassifierConfig;
use crate::contracts::{self, ContractShape, detections, disease_label, legacy};
use crate::schema::{Normalization, NormalizedResult, RawResponse};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use thiserror::Error;

/// Default label pattern marking an infected detection.
pub const DEFAULT_INFECTION_PATTERN: &str = "botrytis";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid infection pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Reduces any supported service response to a [`NormalizedResult`].
///
/// Holds no mutable state; the same input always yields the same output.
#[derive(Debug, Clone)]
pub struct NormalizationEngine {
    infection_marker: Regex,
    disease_label: String,
}

impl NormalizationEngine {
    pub fn new(infection_pattern: &str, disease_label: impl Into<String>) -> Result<Self, EngineError> {
        let infection_marker = RegexBuilder::new(infection_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| EngineError::InvalidPattern {
                pattern: infection_pattern.to_string(),
                source,
            })?;

        Ok(Self {
            infection_marker,
            disease_label: disease_label.into(),
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, EngineError> {
        Self::new(&config.infection_pattern, config.disease_label.clone())
    }

    pub fn normalize(&self, response: &Value) -> NormalizedResult {
        self.normalize_with_report(response).result
    }

    /// Normalize and also report which contract was used.
    pub fn normalize_with_report(&self, response: &Value) -> Normalization {
        let raw = RawResponse::new(response);
        let contract = contracts::classify(&raw);
        let recognized = contracts::is_recognized(&raw);

        if !recognized {
            log::warn!(
                "response matched no known contract shape (object: {}); using fail-safe default",
                raw.is_object()
            );
        }
        log::debug!("normalizing response as {} contract", contract);

        let (result, summary) = match contract {
            ContractShape::Legacy => (legacy::reduce(&raw), None),
            ContractShape::DiseaseLabel => (disease_label::reduce(&raw, &self.disease_label), None),
            ContractShape::Detections => {
                let (result, summary) = detections::reduce(&raw, &self.infection_marker);
                (result, Some(summary))
            }
        };

        Normalization {
            result,
            contract,
            recognized,
            summary,
        }
    }
}

impl Default for NormalizationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_INFECTION_PATTERN, disease_label::DEFAULT_DISEASE_LABEL)
            .expect("default infection pattern is a valid regex")
    }
}
