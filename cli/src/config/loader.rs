//! Simple CLI configuration loader for scout
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./scout.json or ./.scout/config.json
//! 3. XDG config: $XDG_CONFIG_HOME/scout/config.json
//! 4. Environment variables only (no files)

use anyhow::{anyhow, Context, Result};
use scout_core::agent::config::default_model_retry;
use scout_core::config::RetrySettings;
use scout_core::{AgentConfig, Locale, ModelParams, Protocol, ResolvedLlmConfig, SearchSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Raw configuration file format. Every field is optional; gaps are filled
/// from the environment and then from protocol defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Protocol to use ("anthropic" or "openai")
    pub protocol: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: Option<String>,
    /// Base URL (uses protocol default if not specified)
    pub base_url: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Model parameters
    pub params: ModelParams,
    /// Additional headers
    pub headers: HashMap<String, String>,
    /// Model request timeout in seconds
    pub timeout_secs: Option<u64>,
    pub max_turns: Option<usize>,
    pub model_retry: Option<RetrySettings>,
    pub system_prompt: Option<String>,
    /// Directory for exported result files
    pub output_dir: Option<PathBuf>,
    pub search: SearchSettings,
    pub locale: Locale,
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// Everything a command needs to build an agent
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub llm: ResolvedLlmConfig,
    pub agent: AgentConfig,
    pub search: SearchSettings,
    pub locale: Locale,
    pub output_dir: PathBuf,
    pub source: ConfigSource,
}

/// CLI configuration loader
#[derive(Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    protocol_override: Option<String>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    max_turns_override: Option<usize>,
    output_dir_override: Option<PathBuf>,
    /// Fixed environment instead of the process environment
    env: Option<HashMap<String, String>>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set protocol override
    pub fn with_protocol_override(mut self, protocol: String) -> Self {
        self.protocol_override = Some(protocol);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    pub fn with_max_turns_override(mut self, max_turns: usize) -> Self {
        self.max_turns_override = Some(max_turns);
        self
    }

    pub fn with_output_dir_override(mut self, dir: PathBuf) -> Self {
        self.output_dir_override = Some(dir);
        self
    }

    /// Read variables from `env` instead of the process environment
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    fn env_var(&self, key: &str) -> Option<String> {
        let value = match &self.env {
            Some(env) => env.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<LoadedConfig> {
        // Step 1: Find and load base configuration
        let (mut config, source) = if let Some(override_path) = &self.config_override {
            let (config, path) = self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            (config, ConfigSource::File(path))
        } else {
            self.search_and_load().await?
        };
        tracing::debug!("Loaded configuration from {}", source);

        // Step 2: Apply flag overrides
        if let Some(protocol) = &self.protocol_override {
            config.protocol = Some(protocol.clone());
        }
        if let Some(api_key) = &self.api_key_override {
            config.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            config.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            config.model = Some(model.clone());
        }
        if let Some(max_turns) = self.max_turns_override {
            config.max_turns = Some(max_turns);
        }
        if let Some(dir) = &self.output_dir_override {
            config.output_dir = Some(dir.clone());
        }

        // Step 3: Resolve to final config
        self.resolve_config(config, source)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<(RawConfig, ConfigSource)> {
        // 1. Current working directory
        let cwd = std::env::current_dir()?;
        for candidate in [cwd.join("scout.json"), cwd.join(".scout").join("config.json")] {
            if candidate.is_file() {
                let config = self.load_file(&candidate).await?;
                return Ok((config, ConfigSource::File(candidate)));
            }
        }

        // 2. XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let candidate = config_dir.join("scout").join("config.json");
            if candidate.is_file() {
                let config = self.load_file(&candidate).await?;
                return Ok((config, ConfigSource::File(candidate)));
            }
        }

        // 3. Environment variables only
        Ok((RawConfig::default(), ConfigSource::Environment))
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<(RawConfig, PathBuf)> {
        if path.is_file() {
            Ok((self.load_file(path).await?, path.to_path_buf()))
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                Ok((self.load_file(&config_file).await?, config_file))
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Pick a protocol: explicit setting, then whichever credential is present
    fn resolve_protocol(&self, config: &RawConfig) -> Result<Protocol> {
        if let Some(protocol) = config
            .protocol
            .clone()
            .or_else(|| self.env_var("SCOUT_PROTOCOL"))
        {
            return protocol
                .parse::<Protocol>()
                .map_err(|e| anyhow!("Configuration error: {}", e));
        }

        let has_anthropic = self.env_var(Protocol::Anthropic.api_key_env()).is_some();
        let has_openai = self.env_var(Protocol::OpenAICompat.api_key_env()).is_some();
        Ok(if !has_anthropic && has_openai {
            Protocol::OpenAICompat
        } else {
            Protocol::Anthropic
        })
    }

    /// Resolve an `env:VAR` reference or a literal key
    fn resolve_api_key(&self, configured: Option<String>, protocol: Protocol) -> Result<String> {
        match configured {
            Some(value) => match value.strip_prefix("env:") {
                Some(var_name) => self.env_var(var_name).ok_or_else(|| {
                    anyhow!(
                        "Missing credential: environment variable {} is not set",
                        var_name
                    )
                }),
                None => Ok(value),
            },
            None => self.env_var(protocol.api_key_env()).ok_or_else(|| {
                anyhow!(
                    "Missing credential: set {} (or api_key in scout.json)",
                    protocol.api_key_env()
                )
            }),
        }
    }

    /// Resolve raw config to the final configuration
    fn resolve_config(&self, config: RawConfig, source: ConfigSource) -> Result<LoadedConfig> {
        let protocol = self.resolve_protocol(&config)?;
        let api_key = self.resolve_api_key(config.api_key, protocol)?;

        let base_url = config
            .base_url
            .or_else(|| self.env_var("SCOUT_BASE_URL"))
            .unwrap_or_else(|| protocol.default_base_url().to_string());
        let model = config
            .model
            .or_else(|| self.env_var("SCOUT_MODEL"))
            .unwrap_or_else(|| protocol.default_model().to_string());

        let mut llm = ResolvedLlmConfig::new(protocol, base_url, api_key, model)
            .with_params(config.params)
            .with_headers(config.headers);
        if let Some(timeout) = config.timeout_secs {
            llm.timeout_secs = timeout;
        }

        llm.validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        let agent = AgentConfig {
            max_turns: config.max_turns.unwrap_or(scout_core::agent::DEFAULT_MAX_TURNS).max(1),
            system_prompt: config.system_prompt,
            model_retry: config.model_retry.unwrap_or_else(default_model_retry),
            ..AgentConfig::default()
        };

        Ok(LoadedConfig {
            llm,
            agent,
            search: config.search,
            locale: config.locale,
            output_dir: config.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            source,
        })
    }
}
