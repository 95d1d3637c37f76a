//! Error types for the chat-completion layer.

use thiserror::Error;

/// Errors that can occur when calling a chat-completion API.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The HTTP request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response carried no assistant content.
    #[error("response contained no content")]
    EmptyResponse,
}
