//! Configuration types for Scout core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Supported LLM protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Anthropic Messages API
    #[serde(rename = "anthropic")]
    Anthropic,
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai")]
    OpenAICompat,
}

impl Protocol {
    /// Get the protocol name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "anthropic",
            Protocol::OpenAICompat => "openai",
        }
    }

    /// Get the default base URL for this protocol
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "https://api.anthropic.com",
            Protocol::OpenAICompat => "https://api.openai.com/v1",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "claude-sonnet-4-5-20250929",
            Protocol::OpenAICompat => "gpt-4o",
        }
    }

    /// Environment variable holding the credential for this protocol
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "ANTHROPIC_API_KEY",
            Protocol::OpenAICompat => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Protocol::Anthropic),
            "openai" | "openai_compat" => Ok(Protocol::OpenAICompat),
            other => Err(ConfigError::InvalidValue {
                field: "protocol".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// The protocol to use
    pub protocol: Protocol,
    /// Base URL for the API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
    /// Additional headers for requests
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_timeout_secs() -> u64 {
    120
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(protocol: Protocol, base_url: String, api_key: String, model: String) -> Self {
        Self {
            protocol,
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
            headers: HashMap::new(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Add multiple headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                message: format!(
                    "API key cannot be empty (set {} or api_key in scout.json)",
                    self.protocol.api_key_env()
                ),
            });
        }

        if self.model.is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            });
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url.clone(),
            });
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "temperature".to_string(),
                    value: temp.to_string(),
                });
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ConfigError::InvalidValue {
                    field: "top_p".to_string(),
                    value: top_p.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Retry settings as they appear in configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    2.0
}

impl RetrySettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .multiplier(self.multiplier)
            .build()
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 4_000,
            multiplier: default_multiplier(),
        }
    }
}

/// Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Base URL of the DuckDuckGo HTML endpoint
    pub base_url: String,
    /// DuckDuckGo region code (`kl` parameter)
    pub region_code: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum hits returned by one tool call
    pub max_results: usize,
    /// User agent sent with search requests
    pub user_agent: String,
    /// Delay between the query variants of one tool call, in milliseconds
    pub pacing_ms: u64,
    pub retry: RetrySettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com".to_string(),
            region_code: "au-en".to_string(),
            timeout_secs: 15,
            max_results: 10,
            user_agent: format!("Mozilla/5.0 (compatible; scout/{})", crate::VERSION),
            pacing_ms: 1_000,
            retry: RetrySettings::default(),
        }
    }
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// Where the assistant is looking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub city: String,
    pub region: String,
    /// Short form used in search phrasing, e.g. "VIC"
    pub region_abbrev: String,
    pub country: String,
    pub currency: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            city: "Melbourne".to_string(),
            region: "Victoria".to_string(),
            region_abbrev: "VIC".to_string(),
            country: "Australia".to_string(),
            currency: "AUD".to_string(),
        }
    }
}

impl Locale {
    /// Lowercase, underscore-separated city name for file names
    pub fn city_slug(&self) -> String {
        let slug: String = self
            .city
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if slug.is_empty() {
            "local".to_string()
        } else {
            slug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResolvedLlmConfig {
        ResolvedLlmConfig::new(
            Protocol::Anthropic,
            Protocol::Anthropic.default_base_url().to_string(),
            "sk-test".to_string(),
            Protocol::Anthropic.default_model().to_string(),
        )
    }

    #[test]
    fn test_empty_api_key_is_missing_credential() {
        let mut cfg = config();
        cfg.api_key = "  ".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut cfg = config();
        cfg.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "base_url"
        ));
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("Anthropic".parse::<Protocol>().unwrap(), Protocol::Anthropic);
        assert_eq!("openai".parse::<Protocol>().unwrap(), Protocol::OpenAICompat);
        assert!("gemini".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_city_slug() {
        assert_eq!(Locale::default().city_slug(), "melbourne");
        let locale = Locale {
            city: "Gold Coast".to_string(),
            ..Locale::default()
        };
        assert_eq!(locale.city_slug(), "gold_coast");
    }

    #[test]
    fn test_search_settings_partial_json_uses_defaults() {
        let settings: SearchSettings = serde_json::from_str(r#"{"max_results": 4}"#).unwrap();
        assert_eq!(settings.max_results, 4);
        assert_eq!(settings.region_code, "au-en");
        assert_eq!(settings.retry.max_retries, 2);
    }
}
