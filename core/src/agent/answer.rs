//! The structured answer produced by one run of the agent loop

use crate::search::SearchHit;
use crate::tools::{ToolKind, ToolResult};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Final answer handed to the formatter and the front ends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentAnswer {
    pub query: String,
    pub city: String,
    pub summary: String,
    pub events_found: Vec<String>,
    pub news_highlights: Vec<String>,
    pub recommendations: Vec<String>,
    pub budget_friendly_options: Vec<String>,
    pub friend_group_suggestions: Vec<String>,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
    /// Run-level messages: upstream failures, early stops, unstructured replies
    pub notes: Vec<String>,
}

/// Shape the model is asked to reply with. Every field is optional and list
/// entries may be strings or small objects.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelReply {
    summary: Option<String>,
    #[serde(deserialize_with = "lenient_items")]
    events_found: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    news_highlights: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    budget_friendly_options: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    friend_group_suggestions: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    sources: Vec<String>,
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(values)) => values.iter().filter_map(item_text).collect(),
        Some(other) => item_text(&other).into_iter().collect(),
    };
    Ok(items)
}

fn item_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .values()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" - "),
        serde_json::Value::Null => return None,
        other => other.to_string(),
    };
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Locate the JSON object in a model reply that may be fenced or wrapped in prose
fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after[body_start..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let open = trimmed.find('{')?;
    let close = trimmed.rfind('}')?;
    (close > open).then(|| &trimmed[open..=close])
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r#"https?://[^\s<>"'()\[\]]+"#).expect("valid url regex"))
}

fn normalize_link(link: &str) -> String {
    link.trim()
        .trim_end_matches(['.', ',', ';', ':', '!', '?'])
        .trim_end_matches('/')
        .to_string()
}

/// Links mentioned in a piece of text, normalized for comparison
pub fn links_in(text: &str) -> Vec<String> {
    url_regex()
        .find_iter(text)
        .map(|m| normalize_link(m.as_str()))
        .collect()
}

/// What the tools actually produced during a run
#[derive(Debug, Clone, Default)]
pub struct RunEvidence {
    pub event_hits: Vec<SearchHit>,
    pub news_hits: Vec<SearchHit>,
    links: HashSet<String>,
    tools_used: Vec<String>,
    search_failures: Vec<String>,
    search_successes: usize,
}

impl RunEvidence {
    /// Record one executed tool call
    pub fn record(&mut self, kind: Option<ToolKind>, result: &ToolResult) {
        let Some(kind) = kind else {
            return;
        };

        if !self.tools_used.iter().any(|t| t == kind.as_str()) {
            self.tools_used.push(kind.as_str().to_string());
        }

        if !kind.is_search() {
            return;
        }

        if !result.success {
            if let Some(error_kind) = &result.error_kind {
                self.search_failures.push(error_kind.clone());
            }
            return;
        }

        self.search_successes += 1;
        for hit in &result.records {
            self.links.insert(normalize_link(&hit.link));
        }
        let bucket = match kind {
            ToolKind::SearchNews => &mut self.news_hits,
            _ => &mut self.event_hits,
        };
        for hit in &result.records {
            if !bucket.iter().any(|h| h.link == hit.link) {
                bucket.push(hit.clone());
            }
        }
    }

    /// Tool names in first-use order
    pub fn tools_used(&self) -> &[String] {
        &self.tools_used
    }

    /// Whether a link was returned by a search tool in this run
    pub fn knows_link(&self, link: &str) -> bool {
        self.links.contains(&normalize_link(link))
    }

    /// Note explaining why searches came back empty, if they all did
    fn search_note(&self) -> Option<String> {
        if self.search_successes > 0 || self.search_failures.is_empty() {
            return None;
        }
        if self.search_failures.iter().any(|k| k == "upstream_unavailable") {
            Some("No results were found because the search service could not be reached.".to_string())
        } else {
            Some("No results were found for this search.".to_string())
        }
    }
}

fn hit_line(hit: &SearchHit) -> String {
    format!("{} - {}", hit.title, hit.link)
}

impl AgentAnswer {
    /// Empty answer for a query
    pub fn new<S: Into<String>>(query: S, city: S) -> Self {
        Self {
            query: query.into(),
            city: city.into(),
            ..Self::default()
        }
    }

    /// Build an answer from the model's final text
    pub fn from_model_text(query: &str, city: &str, text: &str) -> Self {
        let mut answer = Self::new(query, city);

        let reply = extract_json(text).and_then(|json| serde_json::from_str::<ModelReply>(json).ok());
        match reply {
            Some(reply) => {
                answer.summary = reply.summary.unwrap_or_default().trim().to_string();
                answer.events_found = reply.events_found;
                answer.news_highlights = reply.news_highlights;
                answer.recommendations = reply.recommendations;
                answer.budget_friendly_options = reply.budget_friendly_options;
                answer.friend_group_suggestions = reply.friend_group_suggestions;
                answer.sources = reply.sources;
            }
            None => {
                tracing::debug!("Final reply was not structured JSON");
                answer.summary = text.trim().to_string();
                answer
                    .notes
                    .push("The assistant replied without the structured format; showing its reply as-is.".to_string());
            }
        }

        answer
    }

    /// Answer assembled locally from whatever the searches returned
    pub fn from_evidence(query: &str, city: &str, summary: Option<String>, evidence: &RunEvidence) -> Self {
        let mut answer = Self::new(query, city);
        answer.summary = summary.unwrap_or_default().trim().to_string();
        answer.events_found = evidence.event_hits.iter().map(hit_line).collect();
        answer.news_highlights = evidence.news_hits.iter().map(hit_line).collect();

        let mut seen = HashSet::new();
        answer.sources = evidence
            .event_hits
            .iter()
            .chain(evidence.news_hits.iter())
            .filter(|hit| seen.insert(hit.link.clone()))
            .map(|hit| hit.link.clone())
            .collect();
        answer
    }

    /// Stamp run facts onto the answer: executed tools, verified sources, search notes
    pub fn finalize(&mut self, evidence: &RunEvidence) {
        self.tools_used = evidence.tools_used().to_vec();

        let before = self.sources.len();
        self.sources.retain(|entry| {
            let links = links_in(entry);
            !links.is_empty() && links.iter().all(|link| evidence.knows_link(link))
        });
        if self.sources.len() < before {
            tracing::debug!(
                "Dropped {} source(s) not returned by a search tool",
                before - self.sources.len()
            );
        }

        if let Some(note) = evidence.search_note() {
            if !self.notes.contains(&note) {
                self.notes.push(note);
            }
        }
    }

    /// Whether the answer carries anything besides notes
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.events_found.is_empty()
            && self.news_highlights.is_empty()
            && self.recommendations.is_empty()
            && self.budget_friendly_options.is_empty()
            && self.friend_group_suggestions.is_empty()
            && self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tools::ToolResult;

    fn search_result(hits: Vec<SearchHit>) -> ToolResult {
        ToolResult::success("call", "{}").with_records(hits)
    }

    #[test]
    fn test_fenced_json_reply_is_parsed() {
        let text = "Here you go:\n```json\n{\"summary\": \"Jazz all week\", \"events_found\": [\"Jazz at Bird's Basement\", {\"name\": \"Free jazz\", \"price\": \"free\"}]}\n```\nEnjoy!";
        let answer = AgentAnswer::from_model_text("jazz", "Melbourne", text);

        assert_eq!(answer.summary, "Jazz all week");
        assert_eq!(answer.events_found.len(), 2);
        assert_eq!(answer.events_found[0], "Jazz at Bird's Basement");
        assert!(answer.events_found[1].contains("Free jazz"));
        assert!(answer.notes.is_empty());
    }

    #[test]
    fn test_prose_reply_becomes_summary_with_note() {
        let answer = AgentAnswer::from_model_text("jazz", "Melbourne", "Sorry, nothing this week.");
        assert_eq!(answer.summary, "Sorry, nothing this week.");
        assert_eq!(answer.notes.len(), 1);
        assert!(answer.events_found.is_empty());
    }

    #[test]
    fn test_sources_must_come_from_search_results() {
        let mut evidence = RunEvidence::default();
        evidence.record(
            Some(ToolKind::SearchEvents),
            &search_result(vec![SearchHit::new(
                "Jazz night",
                "https://example.com/jazz",
                "free entry",
            )]),
        );

        let mut answer = AgentAnswer::new("jazz", "Melbourne");
        answer.sources = vec![
            "Jazz night - https://example.com/jazz/".to_string(),
            "Made up - https://invented.example.org/page".to_string(),
            "No link at all".to_string(),
        ];
        answer.finalize(&evidence);

        assert_eq!(answer.sources, vec!["Jazz night - https://example.com/jazz/"]);
        assert_eq!(answer.tools_used, vec!["search_events"]);
    }

    #[test]
    fn test_failed_searches_leave_a_note() {
        let mut evidence = RunEvidence::default();
        let failure = ToolResult::failure(
            "call",
            &ToolError::UpstreamUnavailable {
                message: "timed out".to_string(),
            },
        );
        evidence.record(Some(ToolKind::SearchEvents), &failure);

        let mut answer = AgentAnswer::new("jazz", "Melbourne");
        answer.finalize(&evidence);
        assert_eq!(answer.notes.len(), 1);
        assert!(answer.notes[0].contains("could not be reached"));
        assert_eq!(answer.tools_used, vec!["search_events"]);
    }

    #[test]
    fn test_evidence_answer_lists_hits() {
        let mut evidence = RunEvidence::default();
        evidence.record(
            Some(ToolKind::SearchNews),
            &search_result(vec![SearchHit::new("Tram works", "https://news.example.com/trams", "")]),
        );
        evidence.record(
            Some(ToolKind::SearchEvents),
            &search_result(vec![SearchHit::new("Night market", "https://example.com/market", "")]),
        );

        let answer = AgentAnswer::from_evidence("q", "Melbourne", None, &evidence);
        assert_eq!(answer.events_found, vec!["Night market - https://example.com/market"]);
        assert_eq!(answer.news_highlights, vec!["Tram works - https://news.example.com/trams"]);
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(evidence.tools_used(), &["search_news".to_string(), "search_events".to_string()]);
    }
}
