//! Gemini client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Gemini client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API endpoint root (without version path).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key. Required before any remote call is made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used for extraction.
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for generation (0.0 - 1.0). Low values keep quotes verbatim.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-request timeout in seconds. Generation over long PDFs is slow.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    600
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GEMINI_API_KEY`: API key
    /// - `GEMINI_API_BASE`: API endpoint root
    /// - `GEMINI_MODEL`: Model name
    /// - `GEMINI_TEMPERATURE`: Generation temperature
    /// - `GROUNDQA_REQUEST_TIMEOUT`: Per-request timeout in seconds
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            if !val.trim().is_empty() {
                self.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("GEMINI_API_BASE") {
            self = self.with_endpoint(&val);
        }
        if let Ok(val) = std::env::var("GEMINI_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("GEMINI_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = t;
            }
        }
        if let Ok(val) = std::env::var("GROUNDQA_REQUEST_TIMEOUT") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = n;
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert!(config.api_key.is_none());
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LlmConfig = toml::from_str(r#"model = "gemini-2.5-flash""#).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.endpoint, "https://generativelanguage.googleapis.com");
        assert_eq!(config.timeout_secs, 600);
    }

    #[test]
    fn test_with_endpoint_trims_slash() {
        let config = LlmConfig::default().with_endpoint("http://localhost:9000/");
        assert_eq!(config.endpoint, "http://localhost:9000");
    }

    #[test]
    fn test_env_endpoint_trims_slash() {
        std::env::set_var("GEMINI_API_BASE", "http://127.0.0.1:8089/");
        let config = LlmConfig::default().with_env_overrides();
        std::env::remove_var("GEMINI_API_BASE");
        assert_eq!(config.endpoint, "http://127.0.0.1:8089");
    }
}
