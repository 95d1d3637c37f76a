//! Application configuration with file persistence.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShipexError};
use crate::shipment::PromptVersion;

/// Top-level configuration.
///
/// Every field carries a default, so a partial or missing file still
/// yields a usable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipexConfig {
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub extraction: ExtractionSettings,
}

/// Settings for the chat completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the environment variable holding the API key. The key
    /// itself never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Settings for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default)]
    pub prompt_version: PromptVersion,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between consecutive emails in a batch run, to stay under
    /// provider rate limits.
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            prompt_version: PromptVersion::default(),
            max_retries: default_max_retries(),
            request_delay_secs: default_request_delay_secs(),
        }
    }
}

impl ShipexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ShipexError::Config(format!("invalid config file {}: {e}", path.display()))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ShipexError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn default_base_url() -> String {
    shipex_llm::DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    shipex_llm::DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_delay_secs() -> u64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = ShipexConfig::default();

        assert_eq!(config.llm.base_url, shipex_llm::DEFAULT_BASE_URL);
        assert_eq!(config.llm.model, shipex_llm::DEFAULT_MODEL);
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.extraction.prompt_version, PromptVersion::V3);
        assert_eq!(config.extraction.max_retries, 3);
        assert_eq!(config.extraction.request_delay_secs, 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"llm": {"model": "mixtral-8x7b-32768"}}"#).unwrap();

        let config = ShipexConfig::from_file(&path).unwrap();

        assert_eq!(config.llm.model, "mixtral-8x7b-32768");
        assert_eq!(config.llm.base_url, shipex_llm::DEFAULT_BASE_URL);
        assert_eq!(config.extraction.max_retries, 3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ShipexConfig::default();
        config.extraction.prompt_version = PromptVersion::V1;
        config.extraction.request_delay_secs = 0;
        config.save(&path).unwrap();

        let reloaded = ShipexConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.extraction.prompt_version, PromptVersion::V1);
        assert_eq!(reloaded.extraction.request_delay_secs, 0);
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = ShipexConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ShipexError::Config(_)));
    }
}
