//! Agent configuration structures

use crate::config::{Locale, ResolvedLlmConfig, RetrySettings, SearchSettings};
use crate::error::Result;
use crate::llm::{ChatOptions, LlmClient};
use crate::output::{AgentOutput, NullOutput};
use crate::search::{DuckDuckGoBackend, SearchBackend};
use crate::tools::{ToolContext, ToolKind, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Turns allowed when nothing else is configured
pub const DEFAULT_MAX_TURNS: usize = 6;

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

fn default_tools() -> Vec<ToolKind> {
    ToolKind::ALL.to_vec()
}

/// Model calls back off more slowly than searches
pub fn default_model_retry() -> RetrySettings {
    RetrySettings {
        max_retries: 2,
        initial_delay_ms: 1_000,
        max_delay_ms: 8_000,
        multiplier: 2.0,
    }
}

/// Configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of model calls in one run
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Tools offered to the model
    #[serde(default = "default_tools")]
    pub tools: Vec<ToolKind>,

    /// Custom system prompt for the agent (optional)
    /// If not provided, the default system prompt will be used
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Retry policy for model calls
    #[serde(default = "default_model_retry")]
    pub model_retry: RetrySettings,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            tools: default_tools(),
            system_prompt: None,
            model_retry: default_model_retry(),
        }
    }
}

impl AgentConfig {
    /// Turn bound actually enforced; a run always gets at least one model call
    pub fn effective_max_turns(&self) -> usize {
        self.max_turns.max(1)
    }
}

/// Builder for creating agents with resolved LLM configuration
pub struct AgentBuilder {
    llm_config: ResolvedLlmConfig,
    agent_config: AgentConfig,
    locale: Locale,
    search_settings: SearchSettings,
    output_dir: PathBuf,
    llm_client: Option<Arc<dyn LlmClient>>,
    backend: Option<Arc<dyn SearchBackend>>,
}

impl AgentBuilder {
    /// Create a new agent builder with LLM configuration
    pub fn new(llm_config: ResolvedLlmConfig) -> Self {
        Self {
            llm_config,
            agent_config: AgentConfig::default(),
            locale: Locale::default(),
            search_settings: SearchSettings::default(),
            output_dir: PathBuf::from("."),
            llm_client: None,
            backend: None,
        }
    }

    /// Set agent configuration
    pub fn with_agent_config(mut self, agent_config: AgentConfig) -> Self {
        self.agent_config = agent_config;
        self
    }

    /// Set maximum turns (at least one)
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.agent_config.max_turns = max_turns.max(1);
        self
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<ToolKind>) -> Self {
        self.agent_config.tools = tools;
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.agent_config.system_prompt = system_prompt;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_search_settings(mut self, settings: SearchSettings) -> Self {
        self.search_settings = settings;
        self
    }

    /// Directory save_results writes into
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Use an existing model client instead of building one from the config
    pub fn with_llm_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    /// Use an existing search backend instead of DuckDuckGo
    pub fn with_search_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build the agent with the given output handler
    pub fn build_with_output(self, output: Box<dyn AgentOutput>) -> Result<super::AgentCore> {
        let llm_client = match self.llm_client {
            Some(client) => client,
            None => crate::llm::create_client(&self.llm_config)?,
        };
        let backend: Arc<dyn SearchBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(DuckDuckGoBackend::new(self.search_settings.clone())?),
        };

        let context = ToolContext::new(backend, self.locale.clone(), &self.search_settings)
            .with_output_dir(self.output_dir);
        let tool_executor = ToolRegistry::default().create_executor(&self.agent_config.tools, &context);

        Ok(super::AgentCore::new(
            self.agent_config,
            llm_client,
            tool_executor,
            self.locale,
            output,
        )
        .with_chat_options(ChatOptions::from_params(&self.llm_config.params)))
    }

    /// Build the agent with null output
    pub fn build(self) -> Result<super::AgentCore> {
        self.build_with_output(Box::new(NullOutput))
    }
}
