//! News search tool

use crate::config::Locale;
use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::search::{search_variants, SearchBackend, SearchHit};
use crate::tools::{Tool, ToolCall, ToolContext, ToolExample, ToolKind, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const DESCRIPTION: &str = "Search the web for recent local news on a topic (transport, weather, \
     politics, sport, culture). Returns article titles, links, snippets and the publishing site.";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchNewsArgs {
    topic: String,
    #[serde(default)]
    location: Option<String>,
}

/// One news result with the site it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source: String,
}

impl From<&SearchHit> for Article {
    fn from(hit: &SearchHit) -> Self {
        Self {
            title: hit.title.clone(),
            link: hit.link.clone(),
            snippet: hit.snippet.clone(),
            source: source_name(&hit.link),
        }
    }
}

/// Host of a link without the `www.` prefix
fn source_name(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

/// Query variants for one news search
pub fn news_queries(topic: &str, location: Option<&str>, locale: &Locale) -> Vec<String> {
    let city = location.unwrap_or(locale.city.as_str());
    vec![
        format!("{} {} {} news today", city, locale.country, topic),
        format!("{} {} latest updates", city, topic),
        format!("{} {} {} news", locale.region, locale.country, topic),
    ]
}

pub struct SearchNewsTool {
    backend: Arc<dyn SearchBackend>,
    locale: Locale,
    pacing: Duration,
    max_results: usize,
}

impl SearchNewsTool {
    pub fn new(context: &ToolContext) -> Self {
        Self {
            backend: context.backend.clone(),
            locale: context.locale.clone(),
            pacing: context.pacing,
            max_results: context.max_results,
        }
    }
}

#[async_trait]
impl Tool for SearchNewsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SearchNews
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "News topic, e.g. 'local news', 'weather', 'traffic', 'politics'"
                },
                "location": {
                    "type": "string",
                    "description": format!("City or area the news is about. Defaults to {}.", self.locale.city)
                }
            },
            "required": ["topic"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: SearchNewsArgs = call.parse_arguments()?;

        let topic = args.topic.trim();
        if topic.is_empty() {
            return Err(ToolError::invalid_argument("topic must not be empty").into());
        }
        let location = args
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let queries = news_queries(topic, location, &self.locale);
        let hits = search_variants(
            self.backend.as_ref(),
            &queries,
            self.pacing,
            self.max_results,
            topic,
        )
        .await?;

        tracing::info!(topic = %topic, hits = hits.len(), "News search finished");
        let articles: Vec<Article> = hits.iter().map(Article::from).collect();
        let output = json!({
            "topic": topic,
            "location": location.unwrap_or(self.locale.city.as_str()),
            "count": articles.len(),
            "articles": articles,
        });

        Ok(ToolResult::json(&call.id, &output)?.with_records(hits))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Latest public transport news".to_string(),
            parameters: json!({"topic": "public transport"}),
            expected_result: "Recent articles about trains, trams and buses".to_string(),
        }]
    }
}

impl_tool_factory!(
    SearchNewsToolFactory,
    SearchNewsTool,
    ToolKind::SearchNews,
    DESCRIPTION
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchSettings;
    use crate::error::SearchError;

    struct FixedBackend;

    #[async_trait]
    impl SearchBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, text: &str) -> std::result::Result<Vec<SearchHit>, SearchError> {
            if text.contains("latest updates") {
                Ok(vec![SearchHit::new(
                    "Tram works this weekend",
                    "https://www.theage.com.au/trams",
                    "Route 96 replaced by buses",
                )])
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn test_news_queries() {
        assert_eq!(
            news_queries("weather", None, &Locale::default()),
            vec![
                "Melbourne Australia weather news today",
                "Melbourne weather latest updates",
                "Victoria Australia weather news",
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_reports_article_source() {
        let settings = SearchSettings {
            pacing_ms: 0,
            ..SearchSettings::default()
        };
        let context = ToolContext::new(Arc::new(FixedBackend), Locale::default(), &settings);
        let tool = SearchNewsTool::new(&context);

        let result = tool
            .execute(ToolCall::new("search_news", json!({"topic": "transport"})))
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["articles"][0]["source"], "theage.com.au");
        assert_eq!(result.records[0].link, "https://www.theage.com.au/trams");
    }

    #[tokio::test]
    async fn test_empty_topic_is_rejected() {
        let settings = SearchSettings::default();
        let context = ToolContext::new(Arc::new(FixedBackend), Locale::default(), &settings);
        let tool = SearchNewsTool::new(&context);

        let err = tool
            .execute(ToolCall::new("search_news", json!({"topic": "  "})))
            .await
            .unwrap_err()
            .into_tool_error("search_news");
        assert_eq!(err.kind(), "invalid_argument");
    }
}
