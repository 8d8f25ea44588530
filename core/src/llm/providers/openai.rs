//! OpenAI-compatible client implementation using async-openai library

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// OpenAI-compatible client using async-openai library
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            }
            .into());
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.base_url.trim_end_matches('/'));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Network {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        if !config.headers.is_empty() {
            tracing::debug!("Extra headers are not forwarded by the OpenAI-compatible client");
        }

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            model: config.model.clone(),
        })
    }

    /// Convert our internal message format to async-openai format
    fn convert_messages(&self, messages: Vec<LlmMessage>) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => {
                    let content = message.get_text().unwrap_or_default();
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    let content = message.get_text().unwrap_or_default();
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    let mut content = String::new();
                    let mut tool_calls = Vec::new();

                    for block in message.blocks() {
                        match block {
                            ContentBlock::Text { text } => {
                                if !content.is_empty() {
                                    content.push('\n');
                                }
                                content.push_str(&text);
                            }
                            ContentBlock::ToolUse { id, name, input } => {
                                tool_calls.push(ChatCompletionMessageToolCall {
                                    id,
                                    r#type: ChatCompletionToolType::Function,
                                    function: async_openai::types::FunctionCall {
                                        name,
                                        arguments: input.to_string(),
                                    },
                                });
                            }
                            ContentBlock::ToolResult { .. } => {}
                        }
                    }

                    converted.push(ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: if content.is_empty() {
                                None
                            } else {
                                Some(ChatCompletionRequestAssistantMessageContent::Text(content))
                            },
                            tool_calls: if tool_calls.is_empty() {
                                None
                            } else {
                                Some(tool_calls)
                            },
                            ..Default::default()
                        },
                    ));
                }
                MessageRole::Tool => {
                    let mut pushed_any = false;
                    for block in message.blocks() {
                        if let ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            ..
                        } = block
                        {
                            converted.push(ChatCompletionRequestMessage::Tool(
                                ChatCompletionRequestToolMessage {
                                    content: ChatCompletionRequestToolMessageContent::Text(content),
                                    tool_call_id: tool_use_id,
                                },
                            ));
                            pushed_any = true;
                        }
                    }
                    if !pushed_any {
                        return Err(LlmError::InvalidRequest {
                            message: "Tool message must contain ToolResult".to_string(),
                        }
                        .into());
                    }
                }
            }
        }

        Ok(converted)
    }

    /// Convert our tool definitions to async-openai format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }
}

/// Map async-openai failures onto the retry-aware error taxonomy
fn map_openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::Reqwest(e) => LlmError::Network {
            message: e.to_string(),
        },
        OpenAIError::ApiError(api) => {
            let code = api.code.clone().unwrap_or_default();
            let kind = api.r#type.clone().unwrap_or_default();
            match (kind.as_str(), code.as_str()) {
                (_, "invalid_api_key") | ("authentication_error", _) => LlmError::Authentication {
                    message: api.message,
                },
                (_, "rate_limit_exceeded") => LlmError::RateLimit,
                ("server_error", _) => LlmError::ApiError {
                    status: 500,
                    message: api.message,
                },
                _ => LlmError::InvalidRequest {
                    message: api.message,
                },
            }
        }
        OpenAIError::JSONDeserialize(e) => LlmError::InvalidResponse {
            message: e.to_string(),
        },
        other => LlmError::InvalidRequest {
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = self.convert_messages(messages)?;
        let converted_tools = tools.map(|t| self.convert_tools(t));

        if let Some(ref tools) = converted_tools {
            tracing::debug!("OpenAI request with {} tools enabled", tools.len());
        }

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        if let Some(tools) = converted_tools {
            request_builder.tools(tools);
        }

        let opts = options.unwrap_or_default();
        if let Some(max_tokens) = opts.max_tokens {
            request_builder.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = opts.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(top_p) = opts.top_p {
            request_builder.top_p(top_p);
        }
        if let Some(stop) = opts.stop {
            request_builder.stop(stop);
        }

        let request = request_builder.build().map_err(|e| LlmError::InvalidRequest {
            message: format!("Failed to build request: {}", e),
        })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("OpenAI API call failed: {}", e);
            map_openai_error(e)
        })?;

        convert_response(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// Convert async-openai response to our internal format
fn convert_response(response: async_openai::types::CreateChatCompletionResponse) -> Result<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            message: "No choices in response".to_string(),
        })?;

    let mut blocks = Vec::new();
    if let Some(content) = choice.message.content {
        if !content.is_empty() {
            blocks.push(ContentBlock::Text { text: content });
        }
    }

    for tool_call in choice.message.tool_calls.unwrap_or_default() {
        let function = tool_call.function;
        // Unparseable arguments are passed through as a string and rejected by the tool
        let args: Value = serde_json::from_str(&function.arguments)
            .unwrap_or_else(|_| Value::String(function.arguments.clone()));

        tracing::debug!("Tool call: {} (id: {})", function.name, tool_call.id);
        blocks.push(ContentBlock::ToolUse {
            id: tool_call.id,
            name: function.name,
            input: args,
        });
    }

    let message_content = match blocks.as_slice() {
        [] => MessageContent::Text(String::new()),
        [ContentBlock::Text { text }] => MessageContent::Text(text.clone()),
        _ => MessageContent::MultiModal(blocks),
    };

    let usage = response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let finish_reason = choice.finish_reason.map(|reason| match reason {
        async_openai::types::FinishReason::Stop => FinishReason::Stop,
        async_openai::types::FinishReason::Length => FinishReason::Length,
        async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
        async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
        async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
    });

    Ok(LlmResponse {
        message: LlmMessage {
            role: MessageRole::Assistant,
            content: message_content,
        },
        usage,
        model: response.model,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Protocol;
    use serde_json::json;

    fn client() -> OpenAiClient {
        OpenAiClient::new(&ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "http://localhost:1/v1".to_string(),
            "sk-test".to_string(),
            "gpt-test".to_string(),
        ))
        .unwrap()
    }

    #[test]
    fn test_tool_round_trip_messages_convert() {
        let messages = vec![
            LlmMessage::system("be helpful"),
            LlmMessage::user("find jazz"),
            LlmMessage {
                role: MessageRole::Assistant,
                content: MessageContent::MultiModal(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "search_events".to_string(),
                    input: json!({"query": "jazz"}),
                }]),
            },
            LlmMessage::tool_result("call_1", "[]", false),
        ];

        let converted = client().convert_messages(messages).unwrap();
        assert_eq!(converted.len(), 4);
        assert!(matches!(
            &converted[2],
            ChatCompletionRequestMessage::Assistant(m) if m.tool_calls.as_ref().map(|c| c.len()) == Some(1)
        ));
        assert!(matches!(
            &converted[3],
            ChatCompletionRequestMessage::Tool(m) if m.tool_call_id == "call_1"
        ));
    }

    #[test]
    fn test_tool_message_without_result_is_rejected() {
        let bad = LlmMessage {
            role: MessageRole::Tool,
            content: MessageContent::Text("orphan".to_string()),
        };
        assert!(client().convert_messages(vec![bad]).is_err());
    }

    #[test]
    fn test_missing_key_is_authentication_error() {
        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            String::new(),
            "gpt-4o".to_string(),
        );
        assert!(OpenAiClient::new(&config).is_err());
    }
}
