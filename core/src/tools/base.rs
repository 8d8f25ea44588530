//! Base tool traits and structures

use crate::error::{Result, ToolError};
use crate::search::SearchHit;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

/// The closed set of tools the model may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    SearchEvents,
    SearchNews,
    FilterByBudget,
    SaveResults,
}

impl ToolKind {
    /// Every tool, in the order they are offered to the model
    pub const ALL: [ToolKind; 4] = [
        ToolKind::SearchEvents,
        ToolKind::SearchNews,
        ToolKind::FilterByBudget,
        ToolKind::SaveResults,
    ];

    /// Name declared in the tool schema
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::SearchEvents => "search_events",
            ToolKind::SearchNews => "search_news",
            ToolKind::FilterByBudget => "filter_by_budget",
            ToolKind::SaveResults => "save_results",
        }
    }

    /// Whether results of this tool are raw web search hits
    pub fn is_search(&self) -> bool {
        matches!(self, ToolKind::SearchEvents | ToolKind::SearchNews)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ToolError::invalid_argument(format!("unknown tool '{}'", s)))
    }
}

/// Trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which declared tool this is
    fn kind(&self) -> ToolKind;

    /// Get the name of the tool
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, call: ToolCall) -> Result<ToolResult>;

    /// Get examples of how to use this tool
    fn examples(&self) -> Vec<ToolExample> {
        Vec::new()
    }
}

/// A call to a tool, as requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Parameters to pass to the tool
    pub parameters: serde_json::Value,
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result content fed back to the model
    pub content: String,

    /// Optional structured data
    pub data: Option<serde_json::Value>,

    /// Search hits produced by this call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<SearchHit>,

    /// Failure kind, set when `success` is false
    pub error_kind: Option<String>,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

/// Example usage of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExample {
    /// Description of what this example does
    pub description: String,

    /// Example parameters
    pub parameters: serde_json::Value,

    /// Expected result description
    pub expected_result: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(name: S, parameters: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parameters,
        }
    }

    /// Deserialize the whole argument object into a typed record
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> std::result::Result<T, ToolError> {
        if !self.parameters.is_object() {
            return Err(ToolError::invalid_argument(format!(
                "arguments for '{}' must be a JSON object",
                self.name
            )));
        }

        serde_json::from_value(self.parameters.clone()).map_err(|e| {
            ToolError::invalid_argument(format!("invalid arguments for '{}': {}", self.name, e))
        })
    }
}

impl ToolResult {
    /// Create a successful result
    pub fn success<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: content.into(),
            data: None,
            records: Vec::new(),
            error_kind: None,
            duration_ms: None,
        }
    }

    /// Successful result whose content is the JSON rendering of `data`
    pub fn json<T: Serialize>(tool_call_id: &str, data: &T) -> Result<Self> {
        let value = serde_json::to_value(data)?;
        let content = serde_json::to_string(&value)?;
        Ok(Self::success(tool_call_id.to_string(), content).with_data(value))
    }

    /// Structured failure fed back to the model as an error result
    pub fn failure(tool_call_id: &str, error: &ToolError) -> Self {
        let body = json!({
            "error": error.kind(),
            "message": error.to_string(),
            "hint": failure_hint(error),
        });

        Self {
            tool_call_id: tool_call_id.to_string(),
            success: false,
            content: body.to_string(),
            data: Some(body),
            records: Vec::new(),
            error_kind: Some(error.kind().to_string()),
            duration_ms: None,
        }
    }

    /// Set structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the search hits this call produced
    pub fn with_records(mut self, records: Vec<SearchHit>) -> Self {
        self.records = records;
        self
    }

    /// Set execution duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

fn failure_hint(error: &ToolError) -> &'static str {
    match error {
        ToolError::InvalidArgument { .. } => {
            "Check the tool name and argument types against the declared schema, then retry."
        }
        ToolError::UpstreamUnavailable { .. } => {
            "The search service could not be reached. Report that no results were found for this search."
        }
        ToolError::NoResults { .. } => {
            "Try a broader or differently worded query, or report that nothing was found."
        }
        ToolError::ExecutionFailed { .. } => "The action could not be completed; continue without it.",
    }
}

/// Tool executor that resolves declared names to handlers
pub struct ToolExecutor {
    tools: HashMap<ToolKind, Box<dyn Tool>>,
    order: Vec<ToolKind>,
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool, replacing any earlier tool of the same kind
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        let kind = tool.kind();
        if self.tools.insert(kind, tool).is_none() {
            self.order.push(kind);
        }
    }

    /// Get a tool by kind
    pub fn get_tool(&self, kind: ToolKind) -> Option<&dyn Tool> {
        self.tools.get(&kind).map(|t| t.as_ref())
    }

    /// Registered tools in registration order
    pub fn kinds(&self) -> &[ToolKind] {
        &self.order
    }

    /// List all available tool names
    pub fn list_tools(&self) -> Vec<&str> {
        self.order.iter().map(|kind| kind.as_str()).collect()
    }

    /// Execute a tool call.
    ///
    /// Only tools listed in `offered` may run; anything else is rejected with
    /// `InvalidArgument` without executing. Failures come back as error
    /// results, never as `Err`.
    pub async fn execute(&self, call: ToolCall, offered: &[ToolKind]) -> ToolResult {
        let call_id = call.id.clone();
        let tool = match self.resolve(&call.name, offered) {
            Ok(tool) => tool,
            Err(err) => {
                tracing::warn!(tool = %call.name, "Rejected tool call: {}", err);
                return ToolResult::failure(&call_id, &err).with_duration(0);
            }
        };

        tracing::debug!(tool = %call.name, arguments = %call.parameters, "Executing tool");
        let start_time = Instant::now();
        let name = call.name.clone();
        let result = tool.execute(call).await;
        let duration = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(result) => result.with_duration(duration),
            Err(e) => {
                let err = e.into_tool_error(&name);
                tracing::warn!(tool = %name, kind = err.kind(), "Tool failed: {}", err);
                ToolResult::failure(&call_id, &err).with_duration(duration)
            }
        }
    }

    fn resolve(&self, name: &str, offered: &[ToolKind]) -> std::result::Result<&dyn Tool, ToolError> {
        let kind: ToolKind = name.parse()?;
        if !offered.contains(&kind) {
            return Err(ToolError::invalid_argument(format!(
                "tool '{}' was not offered in this turn",
                name
            )));
        }
        self.get_tool(kind).ok_or_else(|| {
            ToolError::invalid_argument(format!("tool '{}' is not available", name))
        })
    }

    /// Get tool definitions for the given kinds, in registration order
    pub fn get_tool_definitions(&self, kinds: &[ToolKind]) -> Vec<crate::llm::ToolDefinition> {
        self.order
            .iter()
            .filter(|kind| kinds.contains(kind))
            .filter_map(|kind| self.tools.get(kind))
            .map(|tool| crate::llm::ToolDefinition {
                tool_type: "function".to_string(),
                function: crate::llm::FunctionDefinition {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters_schema(),
                },
            })
            .collect()
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}
