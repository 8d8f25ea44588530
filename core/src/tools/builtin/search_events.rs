//! Event search tool

use crate::config::Locale;
use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::query::format_amount;
use crate::search::{search_variants, SearchBackend, SearchHit};
use crate::tools::{Tool, ToolCall, ToolContext, ToolExample, ToolKind, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const DESCRIPTION: &str = "Search the web for upcoming local events (concerts, meetups, festivals, markets, \
     comedy, sport). Runs several phrasings of the query and returns the matching pages with \
     title, link, snippet and a price when one is mentioned. Pass budget 0 to look for free events.";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchEventsArgs {
    query: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    budget: Option<f64>,
}

/// Payload returned to the model
#[derive(Debug, Serialize)]
struct EventSearchOutput<'a> {
    query: &'a str,
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<f64>,
    count: usize,
    events: &'a [SearchHit],
}

/// Searches for events around the configured city
pub struct SearchEventsTool {
    backend: Arc<dyn SearchBackend>,
    locale: Locale,
    pacing: Duration,
    max_results: usize,
}

impl SearchEventsTool {
    pub fn new(context: &ToolContext) -> Self {
        Self {
            backend: context.backend.clone(),
            locale: context.locale.clone(),
            pacing: context.pacing,
            max_results: context.max_results,
        }
    }
}

/// Query variants for one event search, most specific first
pub fn event_queries(
    query: &str,
    location: Option<&str>,
    budget: Option<f64>,
    locale: &Locale,
    month_year: &str,
) -> Vec<String> {
    let city = location.unwrap_or(locale.city.as_str());
    let subject = match budget {
        Some(b) if b == 0.0 => format!("free {}", query),
        Some(b) => format!("{} under ${}", query, format_amount(b)),
        None => query.to_string(),
    };

    vec![
        format!("{} events in {} {} this week", subject, city, locale.country),
        format!("{} in {} {} upcoming events", subject, city, locale.region_abbrev),
        format!("things to do {} {} this weekend", city, subject),
        format!("{} {} {}", city, subject, month_year),
    ]
}

#[async_trait]
impl Tool for SearchEventsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SearchEvents
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Type of event to look for, e.g. 'jazz', 'tech meetups', 'food festival'"
                },
                "location": {
                    "type": "string",
                    "description": format!("Suburb or city to search in. Defaults to {}.", self.locale.city)
                },
                "budget": {
                    "type": "number",
                    "minimum": 0,
                    "description": format!("Optional maximum ticket price in {}. 0 searches for free events.", self.locale.currency)
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: SearchEventsArgs = call.parse_arguments()?;

        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::invalid_argument("query must not be empty").into());
        }
        if let Some(budget) = args.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(ToolError::invalid_argument(format!(
                    "budget must be a non-negative number, got {}",
                    budget
                ))
                .into());
            }
        }
        let location = args
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let month_year = chrono::Local::now().format("%B %Y").to_string();
        let queries = event_queries(query, location, args.budget, &self.locale, &month_year);

        let hits = search_variants(
            self.backend.as_ref(),
            &queries,
            self.pacing,
            self.max_results,
            query,
        )
        .await?;

        tracing::info!(query = %query, hits = hits.len(), "Event search finished");
        let output = EventSearchOutput {
            query,
            location: location.unwrap_or(self.locale.city.as_str()),
            budget: args.budget,
            count: hits.len(),
            events: &hits,
        };

        Ok(ToolResult::json(&call.id, &output)?.with_records(hits))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![
            ToolExample {
                description: "Find free jazz this weekend".to_string(),
                parameters: json!({"query": "jazz", "budget": 0}),
                expected_result: "Event pages mentioning free jazz performances".to_string(),
            },
            ToolExample {
                description: "Find tech meetups in a specific suburb".to_string(),
                parameters: json!({"query": "tech meetups", "location": "Fitzroy"}),
                expected_result: "Meetup and event listing pages".to_string(),
            },
        ]
    }
}

impl_tool_factory!(
    SearchEventsToolFactory,
    SearchEventsTool,
    ToolKind::SearchEvents,
    DESCRIPTION
);
