pub mod raw;
pub mod result;

// Re-export commonly used types
pub use raw::{RawDetection, RawResponse};
pub use result::{DetectionSummary, Normalization, NormalizedResult, Verdict};
