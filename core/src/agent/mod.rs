//! Agent loop: model calls, tool execution and the final answer

pub mod answer;
pub mod config;
pub mod core;
pub mod execution;
pub mod prompt;

pub use answer::{AgentAnswer, RunEvidence};
pub use config::{AgentBuilder, AgentConfig, DEFAULT_MAX_TURNS};
pub use core::AgentCore;
pub use execution::{AgentRun, StopReason, ToolExecutionRecord};
pub use prompt::{build_system_prompt, build_user_message};
