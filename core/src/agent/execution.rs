//! Agent execution result structures

use super::answer::AgentAnswer;
use crate::llm::Usage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the loop reached `Done`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The model answered without requesting more tools
    Completed,
    /// The turn bound was hit; the answer is a local partial one
    TurnLimitExceeded { max_turns: usize },
    /// The model could not be reached after retries
    ModelUnavailable { message: String },
}

impl StopReason {
    pub fn is_completed(&self) -> bool {
        matches!(self, StopReason::Completed)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "completed"),
            StopReason::TurnLimitExceeded { max_turns } => {
                write!(f, "stopped after {} turns", max_turns)
            }
            StopReason::ModelUnavailable { message } => write!(f, "model unavailable: {}", message),
        }
    }
}

/// One executed tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionRecord {
    /// Turn in which the model requested the call
    pub turn: usize,
    pub name: String,
    pub arguments: serde_json::Value,
    pub success: bool,
    pub error_kind: Option<String>,
    pub duration_ms: u64,
}

/// Result of one run of the agent loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub answer: AgentAnswer,
    pub stop_reason: StopReason,
    /// Number of model calls made
    pub turns_used: usize,
    /// Tool executions in execution order
    pub tool_executions: Vec<ToolExecutionRecord>,
    pub usage: Usage,
    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl AgentRun {
    /// Whether the model produced its own final answer
    pub fn is_complete(&self) -> bool {
        self.stop_reason.is_completed()
    }

    /// Number of tool calls that failed
    pub fn failed_tool_calls(&self) -> usize {
        self.tool_executions.iter().filter(|r| !r.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_serializes_with_tag() {
        let value = serde_json::to_value(StopReason::TurnLimitExceeded { max_turns: 6 }).unwrap();
        assert_eq!(value["reason"], "turn_limit_exceeded");
        assert_eq!(value["max_turns"], 6);
        assert_eq!(
            StopReason::TurnLimitExceeded { max_turns: 6 }.to_string(),
            "stopped after 6 turns"
        );
    }
}
