//! Output abstraction layer for Scout core
//!
//! The agent loop reports progress through [`AgentOutput`]; front ends decide
//! how (or whether) to show it. Rendering of finished answers lives in
//! [`formatter`], file export in [`export`].

pub mod export;
pub mod formatter;

use crate::agent::StopReason;
use crate::llm::Usage;
use crate::tools::{ToolCall, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use formatter::{parse_sections, render_sections, render_text, Section, SECTION_LABELS};

/// Null output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(
        &self,
        _event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Status of tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolExecutionStatus {
    /// Tool is currently executing
    Executing,
    /// Tool completed successfully
    Success,
    /// Tool reported a failure back to the model
    Error,
}

/// Tool execution information carried by progress events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionInfo {
    pub execution_id: String,
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub status: ToolExecutionStatus,
    /// Stable error kind when the tool failed
    pub error_kind: Option<String>,
    /// Number of records the tool produced, for search tools
    pub record_count: Option<usize>,
    pub duration_ms: Option<u64>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ToolExecutionInfo {
    /// Info for a call that is about to run
    pub fn started(call: &ToolCall) -> Self {
        Self {
            execution_id: call.id.clone(),
            tool_name: call.name.clone(),
            parameters: call.parameters.clone(),
            status: ToolExecutionStatus::Executing,
            error_kind: None,
            record_count: None,
            duration_ms: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Info for a call that has finished
    pub fn completed(call: &ToolCall, result: &ToolResult) -> Self {
        Self {
            status: if result.success {
                ToolExecutionStatus::Success
            } else {
                ToolExecutionStatus::Error
            },
            error_kind: result.error_kind.clone(),
            record_count: if result.records.is_empty() {
                None
            } else {
                Some(result.records.len())
            },
            duration_ms: result.duration_ms,
            timestamp: chrono::Utc::now(),
            ..Self::started(call)
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        Self {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

/// Events that can be emitted during one run of the agent loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// A query was handed to the loop
    RunStarted {
        query: String,
        model: String,
        max_turns: usize,
    },
    /// The model is being asked for its next move
    TurnStarted { turn: usize, max_turns: usize },
    /// Tool execution started
    ToolExecutionStarted { tool_info: ToolExecutionInfo },
    /// Tool execution completed, successfully or not
    ToolExecutionCompleted { tool_info: ToolExecutionInfo },
    /// The loop reached `Done`
    RunCompleted {
        stop_reason: StopReason,
        turns: usize,
        token_usage: TokenUsage,
        duration_ms: u64,
    },
}

/// Abstract output interface for agent execution
#[async_trait]
pub trait AgentOutput: Send + Sync {
    /// Emit an agent event
    async fn emit_event(
        &self,
        event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Check if this output handler supports real-time updates
    fn supports_realtime_updates(&self) -> bool {
        false
    }

    /// Flush any buffered output
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_info_reflects_failure() {
        let call = ToolCall::new("search_events", json!({"query": "jazz"}));
        let result = ToolResult::failure(
            &call.id,
            &crate::error::ToolError::NoResults {
                query: "jazz".to_string(),
            },
        );

        let info = ToolExecutionInfo::completed(&call, &result);
        assert_eq!(info.status, ToolExecutionStatus::Error);
        assert_eq!(info.error_kind.as_deref(), Some("no_results"));
        assert_eq!(info.tool_name, "search_events");
        assert_eq!(info.execution_id, call.id);
    }

    #[test]
    fn test_token_usage_from_llm_usage() {
        let usage = Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };
        let tokens = TokenUsage::from(usage);
        assert_eq!(tokens.input_tokens, 10);
        assert_eq!(tokens.total_tokens, 15);
    }
}
