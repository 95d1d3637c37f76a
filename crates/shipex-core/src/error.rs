//! Error types for the shipex-core library.

use thiserror::Error;

/// Main error type for the shipex library.
#[derive(Error, Debug)]
pub enum ShipexError {
    /// Port reference loading error.
    #[error("port reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// Shipment extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from the chat-completion layer.
    #[error("llm error: {0}")]
    Llm(#[from] shipex_llm::LlmError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the port reference table.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// Failed to read the reference file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The reference file is not valid JSON of the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Errors related to shipment record extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Required field is missing after correction.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Field validation failed.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },
}

/// Result type for the shipex library.
pub type Result<T> = std::result::Result<T, ShipexError>;
