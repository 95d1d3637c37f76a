//! Model-backed extraction with retries and deterministic correction.

use std::time::Duration;

use shipex_llm::{ChatBackend, ChatMessage};
use tokio::time::sleep;

use super::corrector::correct;
use super::prompt::{build_extraction_prompt, PromptVersion};
use crate::error::Result;
use crate::models::{EmailMessage, ShipmentCandidate, ShipmentExtraction};
use crate::ports::PortIndex;

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Extracts shipment records from emails through a chat backend.
///
/// The model call is the only fallible, blocking part of the pipeline;
/// it is retried with exponential backoff and degrades to a null-filled
/// record when every attempt fails, so a batch run never stops on one
/// bad response.
pub struct ShipmentExtractor<B> {
    backend: B,
    index: PortIndex,
    prompt_version: PromptVersion,
    max_retries: u32,
}

impl<B: ChatBackend> ShipmentExtractor<B> {
    pub fn new(backend: B, index: PortIndex) -> Self {
        Self {
            backend,
            index,
            prompt_version: PromptVersion::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the prompt template revision.
    pub fn with_prompt_version(mut self, version: PromptVersion) -> Self {
        self.prompt_version = version;
        self
    }

    /// Set the number of model-call attempts per email.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The port reference index this extractor corrects against.
    pub fn index(&self) -> &PortIndex {
        &self.index
    }

    /// Raw candidate record for one email, before correction.
    ///
    /// Retries both failed calls and unparseable replies, doubling the
    /// backoff between attempts starting at 1s. After the last attempt
    /// the fixed null-filled fallback record is returned.
    pub async fn candidate(&self, email: &EmailMessage) -> ShipmentCandidate {
        let prompt = build_extraction_prompt(
            self.prompt_version,
            &email.subject,
            &email.body,
            self.index.records(),
        );
        let messages = [ChatMessage::user(prompt)];

        for attempt in 0..self.max_retries {
            match self.backend.complete(&messages).await {
                Ok(content) => match parse_candidate(&content, &email.id) {
                    Ok(candidate) => return candidate,
                    Err(e) => {
                        tracing::warn!(
                            id = %email.id,
                            attempt = attempt + 1,
                            error = %e,
                            "reply was not a valid candidate record"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        id = %email.id,
                        attempt = attempt + 1,
                        error = %e,
                        "model call failed"
                    );
                }
            }

            if attempt + 1 < self.max_retries {
                sleep(Duration::from_secs(1u64 << attempt)).await;
            }
        }

        tracing::warn!(id = %email.id, attempts = self.max_retries, "using null-filled fallback record");
        ShipmentCandidate::fallback(email.id.clone())
    }

    /// Correct a candidate against the email and freeze it into the
    /// output schema.
    pub fn finalize(
        &self,
        candidate: ShipmentCandidate,
        email: &EmailMessage,
    ) -> Result<ShipmentExtraction> {
        let corrected = correct(candidate, email, &self.index);
        Ok(corrected.into_validated()?)
    }

    /// Full pipeline for one email: prompt, model call with retries,
    /// correction, validation.
    pub async fn extract(&self, email: &EmailMessage) -> Result<ShipmentExtraction> {
        let candidate = self.candidate(email).await;
        self.finalize(candidate, email)
    }
}

/// Parse a model reply into a candidate record. The reply's own id, if
/// any, is replaced by the email id.
pub fn parse_candidate(content: &str, email_id: &str) -> serde_json::Result<ShipmentCandidate> {
    let json = strip_code_fences(content.trim());
    let mut candidate: ShipmentCandidate = serde_json::from_str(json)?;
    candidate.id = email_id.to_string();
    Ok(candidate)
}

/// Strip the markdown code fences some replies wrap around the JSON.
fn strip_code_fences(raw: &str) -> &str {
    let Some(inner) = raw.strip_prefix("```") else {
        return raw;
    };
    let inner = inner.split("```").next().unwrap_or(inner);
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductLine;
    use crate::ports::PortRecord;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use shipex_llm::LlmError;
    use std::sync::Mutex;

    struct ScriptedBackend {
        replies: Mutex<Vec<shipex_llm::Result<String>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<shipex_llm::Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
            }
        }

        fn remaining(&self) -> usize {
            self.replies.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, _messages: &[ChatMessage]) -> shipex_llm::Result<String> {
            self.replies.lock().unwrap().remove(0)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn test_index() -> PortIndex {
        PortIndex::build(vec![
            PortRecord::new("DEHAM", "Hamburg"),
            PortRecord::new("INMAA", "Chennai"),
            PortRecord::new("INMAA", "Chennai ICD"),
        ])
    }

    fn email() -> EmailMessage {
        EmailMessage::new(
            "EMAIL_001",
            "Rate request",
            "Shipment from Hamburg to Chennai ICD via Singapore, 850kg, FOB",
        )
    }

    const GOOD_REPLY: &str = r#"{
        "product_line": "pl_sea_import_lcl",
        "origin_port_code": "DEHAM",
        "origin_port_name": "Hamburg",
        "destination_port_code": "INMAA",
        "destination_port_name": "Chennai",
        "incoterm": "FOB",
        "cargo_weight_kg": 850,
        "cargo_cbm": null,
        "is_dangerous": false
    }"#;

    #[tokio::test]
    async fn test_extracts_and_corrects() {
        let backend = ScriptedBackend::new(vec![Ok(GOOD_REPLY.to_string())]);
        let extractor = ShipmentExtractor::new(backend, test_index());

        let record = extractor.extract(&email()).await.unwrap();

        assert_eq!(record.id, "EMAIL_001");
        assert_eq!(record.product_line, ProductLine::SeaImportLcl);
        assert_eq!(record.destination_port_name.as_deref(), Some("Chennai ICD"));
        assert_eq!(record.origin_port_name.as_deref(), Some("Hamburg"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_unparseable_reply() {
        let backend = ScriptedBackend::new(vec![
            Ok("sorry, I cannot help with that".to_string()),
            Ok(GOOD_REPLY.to_string()),
        ]);
        let extractor = ShipmentExtractor::new(backend, test_index());

        let candidate = extractor.candidate(&email()).await;

        assert_eq!(candidate.origin_port_code.as_deref(), Some("DEHAM"));
        assert_eq!(extractor.backend.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_after_exhausted_retries() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
            Err(LlmError::EmptyResponse),
        ]);
        let extractor = ShipmentExtractor::new(backend, test_index()).with_max_retries(2);

        let candidate = extractor.candidate(&email()).await;

        assert_eq!(candidate, ShipmentCandidate::fallback("EMAIL_001"));
    }

    #[test]
    fn test_parse_candidate_strips_fences() {
        let content = "```json\n{\"origin_port_code\": \"DEHAM\"}\n```";
        let candidate = parse_candidate(content, "EMAIL_007").unwrap();

        assert_eq!(candidate.id, "EMAIL_007");
        assert_eq!(candidate.origin_port_code.as_deref(), Some("DEHAM"));
    }

    #[test]
    fn test_parse_candidate_overrides_reply_id() {
        let candidate = parse_candidate(r#"{"id": "SOMETHING_ELSE"}"#, "EMAIL_002").unwrap();
        assert_eq!(candidate.id, "EMAIL_002");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        // Unterminated fence still yields the payload.
        assert_eq!(strip_code_fences("```json\n{}"), "{}");
    }
}
