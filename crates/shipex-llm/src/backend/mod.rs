//! Chat-completion backend implementations.

pub mod groq;

use async_trait::async_trait;

use crate::{ChatMessage, Result};

/// Trait for chat-completion backends.
///
/// This trait abstracts over hosted chat APIs, allowing the extraction
/// pipeline to run against any OpenAI-compatible provider and letting
/// tests substitute a scripted backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a conversation and return the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier this backend sends requests to.
    fn model(&self) -> &str;
}
