//! Groq chat-completion backend (OpenAI-compatible chat API).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ChatBackend;
use crate::{ChatMessage, LlmError, Result};

/// Default Groq endpoint (OpenAI-compatible path layout).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model used for extraction.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend for the Groq chat-completions API.
pub struct GroqBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqBackend {
    /// Create a backend with the default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a backend with an explicit request timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
        })
    }

    /// Point the backend at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Select the model to request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl ChatBackend for GroqBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!(model = %self.model, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn backend_for(server: &MockServer) -> GroqBackend {
        GroqBackend::new("test-key")
            .unwrap()
            .with_base_url(server.url(""))
            .with_model("test-model")
    }

    #[tokio::test]
    async fn test_returns_assistant_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "{\"ok\":true}"}}
                    ]
                }));
            })
            .await;

        let backend = backend_for(&server);
        let reply = backend
            .complete(&[ChatMessage::user("extract this")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_sends_model_and_temperature() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .json_body_partial(r#"{"model": "test-model", "temperature": 0.0}"#);
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "ok"}}]
                }));
            })
            .await;

        let backend = backend_for(&server);
        backend.complete(&[ChatMessage::user("hi")]).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_surfaces_api_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limit exceeded");
            })
            .await;

        let backend = backend_for(&server);
        let err = backend
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("rate limit"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let backend = backend_for(&server);
        let err = backend
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyResponse));
    }
}
