//! Anthropic Claude client implementation

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, FunctionDefinition, LlmClient, LlmMessage,
    LlmResponse, MessageContent, MessageRole, ToolDefinition, Usage,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for Anthropic".to_string(),
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                LlmError::InvalidRequest {
                    message: format!("invalid header name '{}': {}", name, e),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                LlmError::InvalidRequest {
                    message: format!("invalid header value for '{}': {}", name, e),
                }
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Network {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools, options);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), error_text).into());
        }

        let anthropic_response: AnthropicResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(convert_response(anthropic_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}

fn map_status(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<AnthropicErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    match status {
        401 | 403 => LlmError::Authentication { message },
        429 => LlmError::RateLimit,
        400 | 404 | 413 | 422 => LlmError::InvalidRequest { message },
        _ => LlmError::ApiError { status, message },
    }
}

impl AnthropicClient {
    fn build_request(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> AnthropicRequest {
        let options = options.unwrap_or_default();

        // System text goes in its own field
        let mut system_parts = Vec::new();
        let mut conversation: Vec<AnthropicMessage> = Vec::new();

        for message in messages {
            let role = match message.role {
                MessageRole::System => {
                    if let Some(text) = message.get_text() {
                        system_parts.push(text);
                    }
                    continue;
                }
                MessageRole::Assistant => "assistant",
                // Tool results travel as user turns
                MessageRole::User | MessageRole::Tool => "user",
            };

            let mut blocks = match message.content {
                MessageContent::Text(text) => vec![ContentBlock::Text { text }],
                MessageContent::MultiModal(blocks) => blocks,
            };
            blocks.retain(|b| !matches!(b, ContentBlock::Text { text } if text.trim().is_empty()));
            if blocks.is_empty() {
                continue;
            }

            // Consecutive same-role turns are merged; the API requires alternation
            match conversation.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => conversation.push(AnthropicMessage {
                    role,
                    content: blocks,
                }),
            }
        }

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: options.max_tokens.unwrap_or(4096),
            temperature: options.temperature,
            top_p: options.top_p,
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n\n"))
            },
            messages: conversation,
            tools: tools.map(|t| {
                t.into_iter()
                    .map(|tool| AnthropicTool::from(tool.function))
                    .collect()
            }),
            stop_sequences: options.stop,
        }
    }
}

fn convert_response(response: AnthropicResponse) -> LlmResponse {
    let blocks: Vec<ContentBlock> = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicContent::Text { text } => Some(ContentBlock::Text { text }),
            AnthropicContent::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse { id, name, input })
            }
            AnthropicContent::Other => None,
        })
        .collect();

    let content = match blocks.as_slice() {
        [] => MessageContent::Text(String::new()),
        [ContentBlock::Text { text }] => MessageContent::Text(text.clone()),
        _ => MessageContent::MultiModal(blocks),
    };

    let usage = response.usage.map(|u| Usage {
        prompt_tokens: u.input_tokens,
        completion_tokens: u.output_tokens,
        total_tokens: u.input_tokens + u.output_tokens,
    });

    let finish_reason = response.stop_reason.map(|reason| match reason.as_str() {
        "end_turn" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        "tool_use" => FinishReason::ToolCalls,
        _ => FinishReason::Other(reason),
    });

    LlmResponse {
        message: LlmMessage {
            role: MessageRole::Assistant,
            content,
        },
        usage,
        model: response.model,
        finish_reason,
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

impl From<FunctionDefinition> for AnthropicTool {
    fn from(function: FunctionDefinition) -> Self {
        Self {
            name: function.name,
            description: function.description,
            input_schema: function.parameters,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicContent>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}
