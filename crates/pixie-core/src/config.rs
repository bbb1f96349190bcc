//! Application configuration model.
//!
//! Values are read once at start-up; nothing here changes mid-session.

use serde::{Deserialize, Serialize};

use crate::inference::GenerationParams;
use crate::persona::Persona;

/// 4-bit quantized Gemma 2 9B, fits within ~6-7GB RAM.
pub const DEFAULT_MODEL_ID: &str = "mlx-community/gemma-2-9b-it-4bit";
/// Address of a locally running OpenAI-compatible inference server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
/// Search results are capped to save context tokens.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 5;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub generation: GenerationParams,
    pub search: SearchConfig,
    pub persona: Persona,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Identifier passed to the inference backend's load step
    pub id: String,
    /// Base URL of the inference server
    pub server_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_MODEL_ID.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    /// Request timeout for the search provider, in seconds
    pub timeout_secs: u64,
    /// Initial state of the search toggle in the front end
    pub enabled_by_default: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_SEARCH_RESULTS,
            timeout_secs: 10,
            enabled_by_default: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.generation.max_tokens, 2048);
        assert_eq!(config.search.max_results, 5);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [model]
            server_url = "http://localhost:9000"

            [generation]
            temperature = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.model.id, DEFAULT_MODEL_ID);
        assert_eq!(config.model.server_url, "http://localhost:9000");
        assert_eq!(config.generation.temperature, 0.2);
        assert_eq!(config.generation.top_p, 0.9);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
