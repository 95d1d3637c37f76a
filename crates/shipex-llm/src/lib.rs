//! Chat-completion abstraction layer for shipex.
//!
//! This crate provides a unified interface for calling hosted LLM chat
//! APIs:
//! - `GroqBackend` for the Groq OpenAI-compatible endpoint
//! - any other provider (or a mock server in tests) through the
//!   `ChatBackend` trait

mod backend;
mod chat;
mod error;

pub use backend::ChatBackend;
pub use backend::groq::{DEFAULT_BASE_URL, DEFAULT_MODEL, GroqBackend};
pub use chat::{ChatMessage, ChatRole};
pub use error::LlmError;

/// Result type for chat-completion operations.
pub type Result<T> = std::result::Result<T, LlmError>;
