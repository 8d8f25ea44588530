//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod registry;

pub use base::{Tool, ToolCall, ToolExample, ToolExecutor, ToolKind, ToolResult};
pub use registry::{ToolContext, ToolFactory, ToolRegistry};
