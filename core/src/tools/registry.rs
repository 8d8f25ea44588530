//! Tool registry for managing available tools

use crate::config::{Locale, SearchSettings};
use crate::search::SearchBackend;
use crate::tools::{Tool, ToolExecutor, ToolKind};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything a tool needs at construction time
#[derive(Clone)]
pub struct ToolContext {
    pub backend: Arc<dyn SearchBackend>,
    pub locale: Locale,
    /// Delay between query variants of one search call
    pub pacing: Duration,
    pub max_results: usize,
    /// Directory save_results writes into
    pub output_dir: PathBuf,
}

impl ToolContext {
    pub fn new(backend: Arc<dyn SearchBackend>, locale: Locale, search: &SearchSettings) -> Self {
        Self {
            backend,
            locale,
            pacing: search.pacing(),
            max_results: search.max_results,
            output_dir: PathBuf::from("."),
        }
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }
}

/// Factory trait for creating tools
pub trait ToolFactory: Send + Sync {
    /// Create a new instance of the tool
    fn create(&self, context: &ToolContext) -> Box<dyn Tool>;

    /// The tool this factory creates
    fn kind(&self) -> ToolKind;

    /// Get the description of the tool this factory creates
    fn tool_description(&self) -> &str;
}

/// Registry for managing tool creation and registration
pub struct ToolRegistry {
    factories: HashMap<ToolKind, Box<dyn ToolFactory>>,
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a tool factory
    pub fn register_factory(&mut self, factory: Box<dyn ToolFactory>) {
        self.factories.insert(factory.kind(), factory);
    }

    /// Create a tool by kind
    pub fn create_tool(&self, kind: ToolKind, context: &ToolContext) -> Option<Box<dyn Tool>> {
        self.factories.get(&kind).map(|factory| factory.create(context))
    }

    /// Registered tools in declaration order
    pub fn list_tools(&self) -> Vec<ToolKind> {
        ToolKind::ALL
            .into_iter()
            .filter(|kind| self.factories.contains_key(kind))
            .collect()
    }

    /// Get tool name and description
    pub fn get_tool_info(&self, kind: ToolKind) -> Option<(&'static str, &str)> {
        self.factories
            .get(&kind)
            .map(|factory| (kind.as_str(), factory.tool_description()))
    }

    /// Create a tool executor with the specified tools
    pub fn create_executor(&self, kinds: &[ToolKind], context: &ToolContext) -> ToolExecutor {
        let mut executor = ToolExecutor::new();

        for kind in kinds {
            if let Some(tool) = self.create_tool(*kind, context) {
                executor.register_tool(tool);
            }
        }

        executor
    }

    /// Create a tool executor with all available tools
    pub fn create_executor_with_all(&self, context: &ToolContext) -> ToolExecutor {
        self.create_executor(&self.list_tools(), context)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        registry.register_factory(Box::new(crate::tools::builtin::SearchEventsToolFactory));
        registry.register_factory(Box::new(crate::tools::builtin::SearchNewsToolFactory));
        registry.register_factory(Box::new(crate::tools::builtin::FilterBudgetToolFactory));
        registry.register_factory(Box::new(crate::tools::builtin::SaveResultsToolFactory));

        registry
    }
}

/// Macro to help implement tool factories
#[macro_export]
macro_rules! impl_tool_factory {
    ($factory:ident, $tool:ident, $kind:expr, $description:expr) => {
        pub struct $factory;

        impl $crate::tools::ToolFactory for $factory {
            fn create(&self, context: &$crate::tools::ToolContext) -> Box<dyn $crate::tools::Tool> {
                Box::new($tool::new(context))
            }

            fn kind(&self) -> $crate::tools::ToolKind {
                $kind
            }

            fn tool_description(&self) -> &str {
                $description
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::SearchHit;
    use async_trait::async_trait;

    struct EmptyBackend;

    #[async_trait]
    impl SearchBackend for EmptyBackend {
        fn name(&self) -> &str {
            "empty"
        }

        async fn search(&self, _text: &str) -> Result<Vec<SearchHit>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn context() -> ToolContext {
        ToolContext::new(
            Arc::new(EmptyBackend),
            Locale::default(),
            &SearchSettings::default(),
        )
    }

    #[test]
    fn test_default_registry_has_all_tools() {
        let registry = ToolRegistry::default();
        assert_eq!(registry.list_tools(), ToolKind::ALL.to_vec());
    }

    #[test]
    fn test_tool_creation_and_schemas() {
        let registry = ToolRegistry::default();
        let ctx = context();

        for kind in registry.list_tools() {
            let tool = registry.create_tool(kind, &ctx).unwrap();
            assert_eq!(tool.kind(), kind);
            assert_eq!(tool.name(), kind.as_str());
            assert!(!tool.description().is_empty());

            let (name, description) = registry.get_tool_info(kind).unwrap();
            assert_eq!(name, kind.as_str());
            assert_eq!(description, tool.description());

            let schema = tool.parameters_schema();
            assert_eq!(schema["type"], "object", "{} schema is not an object", kind);
            assert!(
                schema["properties"].as_object().map_or(false, |p| !p.is_empty()),
                "{} has no properties",
                kind
            );
            assert!(!tool.examples().is_empty(), "{} has no examples", kind);
        }
    }

    #[test]
    fn test_executor_with_subset() {
        let registry = ToolRegistry::default();
        let executor =
            registry.create_executor(&[ToolKind::SaveResults, ToolKind::SearchEvents], &context());

        assert_eq!(executor.list_tools(), vec!["save_results", "search_events"]);
        let definitions = executor.get_tool_definitions(&[ToolKind::SearchEvents]);
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].function.name, "search_events");
    }
}
