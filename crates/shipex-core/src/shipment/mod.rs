//! Shipment extraction pipeline: prompt construction, model-call
//! orchestration with retries, deterministic correction, and accuracy
//! evaluation.

pub mod corrector;
pub mod eval;
pub mod extractor;
pub mod prompt;
pub mod rules;

pub use corrector::correct;
pub use eval::{evaluate, AccuracyReport, FieldAccuracy, EVALUATED_FIELDS};
pub use extractor::{parse_candidate, ShipmentExtractor};
pub use prompt::{build_extraction_prompt, PromptVersion};
