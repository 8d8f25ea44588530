//! Minimal configuration module for Scout core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    Locale, ModelParams, Protocol, ResolvedLlmConfig, RetrySettings, SearchSettings,
};
