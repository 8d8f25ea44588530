//! Error types and handling for Scout Core

use thiserror::Error;

/// Result type alias for Scout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Scout Core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Search backend errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Invalid user query
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-specific errors. Always fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing credential: {message}")]
    MissingCredential { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// LLM client errors
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

impl LlmError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimit | LlmError::Network { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Search backend errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("search request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("search request failed: {message}")]
    Network { message: String },

    #[error("search backend returned HTTP {status}")]
    HttpStatus { status: u16 },
}

impl SearchError {
    /// Timeouts, connection failures, 429 and 5xx are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::Timeout { .. } | SearchError::Network { .. } => true,
            SearchError::HttpStatus { status } => *status == 429 || *status >= 500,
        }
    }
}

/// Tool execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("No results for '{query}'")]
    NoResults { query: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },
}

impl ToolError {
    /// Stable machine-readable name fed back to the model
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidArgument { .. } => "invalid_argument",
            ToolError::UpstreamUnavailable { .. } => "upstream_unavailable",
            ToolError::NoResults { .. } => "no_results",
            ToolError::ExecutionFailed { .. } => "execution_failed",
        }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        ToolError::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<SearchError> for ToolError {
    fn from(err: SearchError) -> Self {
        ToolError::UpstreamUnavailable {
            message: err.to_string(),
        }
    }
}

/// Rejected user input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("please enter an event type")]
    MissingInterests,

    #[error("please enter a news topic")]
    MissingNewsTopic,

    #[error("budget must be a non-negative amount, got '{value}'")]
    InvalidBudget { value: String },

    #[error("unknown search type '{value}' (expected events, news or both)")]
    UnknownCategory { value: String },
}

impl Error {
    /// Recover the tool-level view of an error raised inside a tool
    ///
    /// Bad arguments are rejected as [`ToolError::InvalidArgument`] before this
    /// point, so anything else, including failing to encode the output, is an
    /// execution failure.
    pub fn into_tool_error(self, tool_name: &str) -> ToolError {
        match self {
            Error::Tool(err) => err,
            Error::Search(err) => err.into(),
            other => ToolError::ExecutionFailed {
                name: tool_name.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_maps_to_upstream_unavailable() {
        let err: ToolError = SearchError::Timeout { after_ms: 1500 }.into();
        assert_eq!(err.kind(), "upstream_unavailable");
        assert!(err.to_string().contains("1500"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(SearchError::HttpStatus { status: 503 }.is_transient());
        assert!(SearchError::HttpStatus { status: 429 }.is_transient());
        assert!(!SearchError::HttpStatus { status: 403 }.is_transient());
        assert!(LlmError::RateLimit.is_transient());
        assert!(!LlmError::Authentication {
            message: "bad key".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_into_tool_error_keeps_tool_errors() {
        let err = Error::Tool(ToolError::NoResults {
            query: "jazz".to_string(),
        });
        assert_eq!(
            err.into_tool_error("search_events"),
            ToolError::NoResults {
                query: "jazz".to_string()
            }
        );

        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.into_tool_error("save_results").kind(), "execution_failed");
    }

    #[test]
    fn test_output_encoding_failure_is_execution_failure() {
        let mut records = std::collections::HashMap::new();
        records.insert(vec![1u8], "keys must be strings");
        let err: Error = serde_json::to_string(&records).unwrap_err().into();

        match err.into_tool_error("save_results") {
            ToolError::ExecutionFailed { name, message } => {
                assert_eq!(name, "save_results");
                assert!(message.starts_with("Serialization error"));
            }
            other => panic!("expected execution_failed, got {:?}", other),
        }
    }
}
