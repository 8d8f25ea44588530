//! One query through the agent loop, shared by every front end

use crate::config::LoadedConfig;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use scout_core::output::export::{export_filename, render_export_document, write_export};
use scout_core::output::{render_text, AgentOutput};
use scout_core::{AgentRun, Locale, SearchQuery};
use std::path::PathBuf;
use tracing::info;

/// Build a fresh agent for the query and run it to `Done`
pub async fn run_query(
    config: &LoadedConfig,
    query: &SearchQuery,
    output: Box<dyn AgentOutput>,
) -> Result<AgentRun> {
    let mut agent = config
        .agent_builder()
        .build_with_output(output)
        .context("Failed to set up the assistant")?;

    info!(category = query.category.as_str(), "Running query");
    Ok(agent.run(query).await)
}

/// File name and contents of the export document for a run
pub fn export_document(locale: &Locale, run: &AgentRun, timestamp: &NaiveDateTime) -> (String, String) {
    let body = render_text(&run.answer);
    (
        export_filename(locale, timestamp),
        render_export_document(locale, &body, timestamp),
    )
}

/// Write the export document into the configured output directory
pub async fn save_run(config: &LoadedConfig, run: &AgentRun) -> Result<PathBuf> {
    let now = Local::now().naive_local();
    let (filename, contents) = export_document(&config.locale, run, &now);
    write_export(&config.output_dir, &filename, &contents)
        .await
        .with_context(|| format!("Failed to save results to {}", config.output_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scout_core::llm::Usage;
    use scout_core::{AgentAnswer, StopReason};

    #[test]
    fn test_export_document_wraps_rendered_answer() {
        let mut answer = AgentAnswer::new("Find jazz events in Melbourne Australia", "Melbourne");
        answer.events_found = vec!["Jazz on the lawn - https://example.com/lawn".to_string()];
        let run = AgentRun {
            answer,
            stop_reason: StopReason::Completed,
            turns_used: 2,
            tool_executions: Vec::new(),
            usage: Usage::default(),
            duration_ms: 10,
        };
        let timestamp = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();

        let (filename, contents) = export_document(&Locale::default(), &run, &timestamp);
        assert_eq!(filename, "melbourne_events_2026-03-01_18-30-00.txt");
        assert!(contents.contains("Generated: 2026-03-01 18:30:00"));
        assert!(contents.contains("EVENTS FOUND (1)\n  1. Jazz on the lawn - https://example.com/lawn"));
    }
}
