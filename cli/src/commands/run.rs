//! Single query execution command

use crate::config::CliConfigLoader;
use crate::output::{print_run, CliOutputConfig, CliOutputHandler};
use crate::session::{run_query, save_run};
use anyhow::{Context, Result};
use clap::Args;
use scout_core::query::parse_budget;
use scout_core::{SearchCategory, SearchQuery};
use serde_json::json;
use tracing::info;

/// Arguments of `scout run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// What to search for: events, news or both
    #[arg(long = "type", default_value = "events")]
    pub category: SearchCategory,

    /// Event interests, e.g. "live jazz"
    #[arg(long)]
    pub interests: Option<String>,

    /// News topic, e.g. "public transport"
    #[arg(long)]
    pub topic: Option<String>,

    /// Budget ceiling in local currency; omit for any price
    #[arg(long)]
    pub budget: Option<String>,

    /// Print the structured answer as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not write the results file
    #[arg(long)]
    pub no_save: bool,
}

impl RunArgs {
    /// Validate the arguments into a query
    pub fn to_query(&self) -> Result<SearchQuery> {
        let budget = match &self.budget {
            Some(raw) => parse_budget(raw)?,
            None => None,
        };
        let query = SearchQuery::new(
            self.category,
            self.interests.as_deref(),
            self.topic.as_deref(),
            budget,
        )?;
        Ok(query)
    }
}

/// Execute a single query
pub async fn run_command(args: RunArgs, config_loader: CliConfigLoader) -> Result<()> {
    let query = args.to_query().context("Invalid query")?;
    let config = config_loader.load().await?;
    info!("Using protocol: {}", config.llm.protocol.as_str());
    info!("Using model: {}", config.llm.model);

    let output = if args.json {
        CliOutputHandler::quiet()
    } else {
        println!("Searching: {}", query.to_prompt(&config.locale));
        CliOutputHandler::new(CliOutputConfig::default())
    };

    let run = run_query(&config, &query, Box::new(output)).await?;

    let saved = if args.no_save {
        None
    } else {
        Some(save_run(&config, &run).await?)
    };

    if args.json {
        let body = json!({
            "query": query,
            "answer": run.answer,
            "stop_reason": run.stop_reason,
            "turns_used": run.turns_used,
            "tool_executions": run.tool_executions,
            "usage": run.usage,
            "duration_ms": run.duration_ms,
            "saved_to": saved,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_run(&run);
        if let Some(path) = saved {
            println!("\nResults saved to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(category: SearchCategory) -> RunArgs {
        RunArgs {
            category,
            interests: None,
            topic: None,
            budget: None,
            json: false,
            no_save: true,
        }
    }

    #[test]
    fn test_events_need_interests() {
        assert!(args(SearchCategory::Events).to_query().is_err());

        let mut events = args(SearchCategory::Events);
        events.interests = Some("jazz".to_string());
        events.budget = Some("$40".to_string());
        let query = events.to_query().unwrap();
        assert_eq!(query.budget, Some(40.0));
    }

    #[test]
    fn test_news_ignores_budget() {
        let mut news = args(SearchCategory::News);
        news.topic = Some("trams".to_string());
        news.budget = Some("20".to_string());
        let query = news.to_query().unwrap();
        assert_eq!(query.budget, None);
        assert_eq!(query.news_topic.as_deref(), Some("trams"));
    }

    #[test]
    fn test_negative_budget_is_rejected() {
        let mut events = args(SearchCategory::Events);
        events.interests = Some("jazz".to_string());
        events.budget = Some("-5".to_string());
        assert!(events.to_query().is_err());
    }
}
