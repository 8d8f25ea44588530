//! LLM provider implementations

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::Result;
use crate::llm::LlmClient;
use std::sync::Arc;

/// Build the client that speaks the configured protocol
pub fn create_client(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>> {
    config.validate()?;
    tracing::debug!(
        "Creating {} client for model {}",
        config.protocol.as_str(),
        config.model
    );

    let client: Arc<dyn LlmClient> = match config.protocol {
        Protocol::Anthropic => Arc::new(AnthropicClient::new(config)?),
        Protocol::OpenAICompat => Arc::new(OpenAiClient::new(config)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_picks_protocol() {
        let config = ResolvedLlmConfig::new(
            Protocol::Anthropic,
            "https://api.anthropic.com".to_string(),
            "key".to_string(),
            "claude-sonnet-4-5-20250929".to_string(),
        );
        let client = create_client(&config).unwrap();
        assert_eq!(client.provider_name(), "anthropic");

        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            "key".to_string(),
            "gpt-4o".to_string(),
        );
        let client = create_client(&config).unwrap();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_create_client_rejects_empty_key() {
        let config = ResolvedLlmConfig::new(
            Protocol::Anthropic,
            "https://api.anthropic.com".to_string(),
            "  ".to_string(),
            "claude-sonnet-4-5-20250929".to_string(),
        );
        assert!(create_client(&config).is_err());
    }
}
