//! Web search adapter
//!
//! A [`SearchBackend`] turns free text into an ordered, finite list of
//! [`SearchHit`]s. Network failures come back as [`SearchError`]; an empty
//! result page is an empty list, not an error.

pub mod duckduckgo;
pub mod price;

pub use duckduckgo::DuckDuckGoBackend;
pub use price::Price;

use crate::error::{SearchError, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// One raw record returned by a search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub price: Price,
}

impl SearchHit {
    /// Build a hit and derive its price from title and snippet
    pub fn new<S: Into<String>>(title: S, link: S, snippet: S) -> Self {
        let title = title.into();
        let snippet = snippet.into();
        let price = Price::extract(&format!("{} {}", title, snippet));
        Self {
            title,
            link: link.into(),
            snippet,
            price,
        }
    }

    /// Fill in the price from the text when none was given
    pub fn with_derived_price(mut self) -> Self {
        if !self.price.is_known() {
            self.price = Price::extract(&format!("{} {}", self.title, self.snippet));
        }
        self
    }
}

/// A web search provider
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Run one query. Results are ordered by the provider's ranking.
    async fn search(&self, text: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Run several phrasings of one request in order and merge the hits.
///
/// Hits are de-duplicated by link and capped at `max_results`. Fails with
/// `UpstreamUnavailable` only when every query failed, and with `NoResults`
/// when the queries ran but found nothing.
pub async fn search_variants(
    backend: &dyn SearchBackend,
    queries: &[String],
    pacing: Duration,
    max_results: usize,
    label: &str,
) -> Result<Vec<SearchHit>, ToolError> {
    let mut hits = Vec::new();
    let mut seen = HashSet::new();
    let mut failures = Vec::new();

    for (index, query) in queries.iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }

        tracing::debug!(backend = backend.name(), query = %query, "Running search");
        match backend.search(query).await {
            Ok(results) => {
                for hit in results {
                    if hits.len() >= max_results {
                        break;
                    }
                    if seen.insert(hit.link.clone()) {
                        hits.push(hit);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "Search query failed");
                failures.push(err);
            }
        }

        if hits.len() >= max_results {
            break;
        }
    }

    if hits.is_empty() {
        if !failures.is_empty() && failures.len() == queries.len() {
            return Err(failures.remove(failures.len() - 1).into());
        }
        return Err(ToolError::NoResults {
            query: label.to_string(),
        });
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedBackend {
        responses: Mutex<Vec<Result<Vec<SearchHit>, SearchError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<Vec<SearchHit>, SearchError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn search(&self, text: &str) -> Result<Vec<SearchHit>, SearchError> {
            self.seen.lock().unwrap().push(text.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(Vec::new())
            } else {
                responses.remove(0)
            }
        }
    }

    fn hit(n: usize) -> SearchHit {
        SearchHit::new(
            format!("Event {}", n),
            format!("https://example.com/{}", n),
            "snippet".to_string(),
        )
    }

    fn queries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("query {}", i)).collect()
    }

    #[tokio::test]
    async fn test_merges_in_order_and_dedupes() {
        let backend = ScriptedBackend::new(vec![
            Ok(vec![hit(1), hit(2)]),
            Ok(vec![hit(2), hit(3)]),
        ]);

        let hits = search_variants(&backend, &queries(2), Duration::ZERO, 10, "jazz")
            .await
            .unwrap();

        let titles: Vec<_> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Event 1", "Event 2", "Event 3"]);
        assert_eq!(backend.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_once_capped() {
        let backend = ScriptedBackend::new(vec![Ok(vec![hit(1), hit(2), hit(3)])]);

        let hits = search_variants(&backend, &queries(3), Duration::ZERO, 2, "jazz")
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_hits() {
        let backend = ScriptedBackend::new(vec![
            Err(SearchError::Timeout { after_ms: 10 }),
            Ok(vec![hit(1)]),
        ]);

        let hits = search_variants(&backend, &queries(2), Duration::ZERO, 10, "jazz")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_are_upstream_unavailable() {
        let backend = ScriptedBackend::new(vec![
            Err(SearchError::Timeout { after_ms: 10 }),
            Err(SearchError::HttpStatus { status: 502 }),
        ]);

        let err = search_variants(&backend, &queries(2), Duration::ZERO, 10, "jazz")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream_unavailable");
    }

    #[tokio::test]
    async fn test_empty_pages_are_no_results() {
        let backend = ScriptedBackend::new(vec![Ok(Vec::new()), Ok(Vec::new())]);

        let err = search_variants(&backend, &queries(2), Duration::ZERO, 10, "jazz")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::NoResults {
                query: "jazz".to_string()
            }
        );
    }

    #[test]
    fn test_hit_price_is_derived() {
        let hit = SearchHit::new("Free jazz in the park", "https://a.example", "Sunday");
        assert_eq!(hit.price, Price::Free);

        let parsed: SearchHit = serde_json::from_str(
            r#"{"title": "Comedy night", "link": "https://b.example", "snippet": "Tickets $25"}"#,
        )
        .unwrap();
        assert_eq!(parsed.price, Price::Unknown);
        assert_eq!(parsed.with_derived_price().price, Price::Amount(25.0));
    }
}
