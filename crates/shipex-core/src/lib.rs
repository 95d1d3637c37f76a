//! Core library for shipment detail extraction from freight emails.
//!
//! This crate provides:
//! - Port reference index (canonical names, aliases, abbreviations)
//! - Context-aware port name resolution
//! - LLM-backed extraction with retries and fallback
//! - Deterministic field correction (product line, units, weights)
//! - Accuracy evaluation against ground truth

pub mod error;
pub mod models;
pub mod ports;
pub mod shipment;

pub use error::{ExtractionError, ReferenceError, Result, ShipexError};
pub use models::{
    EmailMessage, ProductLine, ShipexConfig, ShipmentCandidate, ShipmentExtraction,
};
pub use ports::resolver::resolve_port_name;
pub use ports::{load_port_reference, PortIndex, PortRecord};
pub use shipment::{
    build_extraction_prompt, correct, evaluate, AccuracyReport, PromptVersion, ShipmentExtractor,
};

/// Re-export chat-completion types.
pub use shipex_llm::{ChatBackend, ChatMessage, GroqBackend};
