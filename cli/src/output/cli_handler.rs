//! CLI output handler implementation

use async_trait::async_trait;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scout_core::output::{AgentEvent, AgentOutput, ToolExecutionInfo, ToolExecutionStatus};
use std::time::Duration;
use tracing::debug;

/// CLI output configuration
#[derive(Debug, Clone)]
pub struct CliOutputConfig {
    /// Whether to show the spinner and tool progress lines
    pub realtime_updates: bool,
    /// Whether to print run statistics when the loop finishes
    pub show_stats: bool,
}

impl Default for CliOutputConfig {
    fn default() -> Self {
        Self {
            realtime_updates: true,
            show_stats: true,
        }
    }
}

/// CLI output handler that reports loop progress on the terminal
pub struct CliOutputHandler {
    config: CliOutputConfig,
    spinner: ProgressBar,
}

impl CliOutputHandler {
    /// Create a new CLI output handler
    pub fn new(config: CliOutputConfig) -> Self {
        let spinner = if config.realtime_updates {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner
        } else {
            ProgressBar::hidden()
        };

        Self { config, spinner }
    }

    /// Handler that prints nothing to the terminal
    pub fn quiet() -> Self {
        Self::new(CliOutputConfig {
            realtime_updates: false,
            show_stats: false,
        })
    }
}

/// Short human description of a tool call, e.g. `search_events "jazz"`
fn describe_call(tool_info: &ToolExecutionInfo) -> String {
    let subject = ["query", "topic", "filename"]
        .iter()
        .find_map(|key| tool_info.parameters.get(*key).and_then(|v| v.as_str()));
    match subject {
        Some(subject) => format!("{} \"{}\"", tool_info.tool_name, subject),
        None => tool_info.tool_name.clone(),
    }
}

fn format_completed(tool_info: &ToolExecutionInfo) -> String {
    let elapsed = tool_info
        .duration_ms
        .map(|ms| format!(" {:.1}s", ms as f64 / 1000.0))
        .unwrap_or_default();

    match tool_info.status {
        ToolExecutionStatus::Success => {
            let detail = tool_info
                .record_count
                .map(|n| format!(" ({} results)", n))
                .unwrap_or_default();
            format!(
                "  {} {}{}{}",
                "✓".green(),
                describe_call(tool_info),
                detail,
                elapsed.dimmed()
            )
        }
        ToolExecutionStatus::Error => format!(
            "  {} {}: {}{}",
            "✗".red(),
            describe_call(tool_info),
            tool_info
                .error_kind
                .as_deref()
                .unwrap_or("failed")
                .replace('_', " ")
                .yellow(),
            elapsed.dimmed()
        ),
        ToolExecutionStatus::Executing => format!("  • {}", describe_call(tool_info)),
    }
}

#[async_trait]
impl AgentOutput for CliOutputHandler {
    async fn emit_event(
        &self,
        event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event {
            AgentEvent::RunStarted {
                query,
                model,
                max_turns,
            } => {
                debug!("Query: {}", query);
                debug!("Model: {} (max {} turns)", model, max_turns);
                self.spinner.enable_steady_tick(Duration::from_millis(120));
                self.spinner.set_message(format!("Asking {}...", model));
            }

            AgentEvent::TurnStarted { turn, max_turns } => {
                debug!("Turn {}/{}", turn, max_turns);
                self.spinner
                    .set_message(format!("Thinking (turn {}/{})...", turn, max_turns));
            }

            AgentEvent::ToolExecutionStarted { tool_info } => {
                self.spinner
                    .set_message(format!("Running {}...", describe_call(&tool_info)));
            }

            AgentEvent::ToolExecutionCompleted { tool_info } => {
                if self.config.realtime_updates {
                    self.spinner.println(format_completed(&tool_info));
                }
            }

            AgentEvent::RunCompleted {
                stop_reason,
                turns,
                token_usage,
                duration_ms,
            } => {
                self.spinner.finish_and_clear();
                debug!("Run finished: {}", stop_reason);

                if self.config.show_stats {
                    let mut stats = format!(
                        "{} turn(s) in {:.1}s",
                        turns,
                        duration_ms as f64 / 1000.0
                    );
                    if token_usage.total_tokens > 0 {
                        stats.push_str(&format!(
                            ", {} input + {} output = {} tokens",
                            token_usage.input_tokens,
                            token_usage.output_tokens,
                            token_usage.total_tokens
                        ));
                    }
                    eprintln!("{}", stats.dimmed());
                }
            }
        }

        Ok(())
    }

    fn supports_realtime_updates(&self) -> bool {
        self.config.realtime_updates
    }

    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use std::io::Write;
        std::io::stdout().flush().map_err(|e| e.into())
    }
}
