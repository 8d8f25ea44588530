//! Configuration discovery and loading for the scout binary

pub mod loader;

pub use loader::{CliConfigLoader, ConfigSource, LoadedConfig, RawConfig};

use scout_core::AgentBuilder;

impl LoadedConfig {
    /// Agent builder carrying every resolved setting
    pub fn agent_builder(&self) -> AgentBuilder {
        AgentBuilder::new(self.llm.clone())
            .with_agent_config(self.agent.clone())
            .with_locale(self.locale.clone())
            .with_search_settings(self.search.clone())
            .with_output_dir(self.output_dir.clone())
    }
}
