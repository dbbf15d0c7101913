pub mod client;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod render;
pub mod schema;

pub use contracts::ContractShape;
pub use engine::NormalizationEngine;
pub use schema::{Normalization, NormalizedResult, Verdict};

static DEFAULT_ENGINE: std::sync::LazyLock<NormalizationEngine> =
    std::sync::LazyLock::new(NormalizationEngine::default);

/// Normalize a decoded service response with the default classifier settings.
pub fn normalize(response: &serde_json::Value) -> NormalizedResult {
    DEFAULT_ENGINE.normalize(response)
}

/// Like [`normalize`], also reporting the contract shape that was used.
pub fn normalize_with_report(response: &serde_json::Value) -> Normalization {
    DEFAULT_ENGINE.normalize_with_report(response)
}
