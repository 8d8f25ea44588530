//! Tools listing command

use anyhow::Result;
use colored::Colorize;
use scout_core::search::DuckDuckGoBackend;
use scout_core::tools::{ToolContext, ToolRegistry};
use scout_core::{Locale, SearchSettings};
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

/// Show available tools
pub async fn tools_command() -> Result<()> {
    info!("Listing available tools");

    // Building the backend opens no connection; tools are only instantiated to read their examples.
    let settings = SearchSettings::default();
    let backend = Arc::new(DuckDuckGoBackend::new(settings.clone())?);
    let context = ToolContext::new(backend, Locale::default(), &settings);

    println!("{}\n", "Available Tools".bold());
    print!("{}", render_tool_listing(&ToolRegistry::default(), &context));
    println!("The assistant decides which of these to call for each query.");
    Ok(())
}

/// Name, description and worked examples of every registered tool
pub fn render_tool_listing(registry: &ToolRegistry, context: &ToolContext) -> String {
    let mut out = String::new();

    for kind in registry.list_tools() {
        let Some((tool_name, description)) = registry.get_tool_info(kind) else {
            continue;
        };
        let _ = writeln!(out, "  {}", tool_name.cyan().bold());
        for line in description.lines() {
            let _ = writeln!(out, "    {}", line.trim());
        }

        let examples = registry
            .create_tool(kind, context)
            .map(|tool| tool.examples())
            .unwrap_or_default();
        for example in examples {
            let _ = writeln!(out, "    {} {}", "Example:".dimmed(), example.description);
            let _ = writeln!(out, "      args: {}", example.parameters);
            let _ = writeln!(out, "      expect: {}", example.expected_result);
        }
        out.push('\n');
    }

    out
}
