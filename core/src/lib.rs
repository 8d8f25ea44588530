//! # Scout Core
//!
//! Core library for scout, a tool-calling assistant that finds local events
//! and news for a city.
//!
//! The pieces, leaves first: a [`search`] adapter over DuckDuckGo, the
//! [`tools`] the model may call, [`llm`] clients, the bounded [`agent`] loop,
//! and [`output`] rendering of the final answer.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod query;
pub mod retry;
pub mod search;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentAnswer, AgentBuilder, AgentConfig, AgentCore, AgentRun, StopReason};
pub use config::{Locale, ModelParams, Protocol, ResolvedLlmConfig, SearchSettings};
pub use error::{Error, Result};
pub use query::{SearchCategory, SearchQuery};

/// Current version of the scout-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
