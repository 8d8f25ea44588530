//! DuckDuckGo HTML search backend
//!
//! Uses the keyless HTML endpoint and scrapes result blocks. Requests go
//! through [`retry_with_backoff`] so timeouts and 5xx answers are retried
//! a bounded number of times before surfacing as [`SearchError`].

use super::{SearchBackend, SearchHit};
use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Search backend backed by html.duckduckgo.com
pub struct DuckDuckGoBackend {
    client: reqwest::Client,
    settings: SearchSettings,
    retry: RetryPolicy,
}

impl DuckDuckGoBackend {
    /// Create a backend from resolved search settings
    pub fn new(settings: SearchSettings) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| SearchError::Network {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let retry = settings.retry.to_policy();
        Ok(Self {
            client,
            settings,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/html/", self.settings.base_url.trim_end_matches('/'))
    }

    async fn fetch_page(&self, text: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("q", text), ("kl", self.settings.region_code.as_str())])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout {
                after_ms: self.settings.timeout().as_millis() as u64,
            }
        } else {
            SearchError::Network {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, text: &str) -> Result<Vec<SearchHit>, SearchError> {
        let html = retry_with_backoff(
            &self.retry,
            || self.fetch_page(text),
            SearchError::is_transient,
        )
        .await?;

        let mut hits = parse_results(&html);
        hits.truncate(self.settings.max_results);
        tracing::debug!(query = %text, hits = hits.len(), "DuckDuckGo search finished");
        Ok(hits)
    }
}

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<a\s(?P<attrs>[^>]*\bresult__a\b[^>]*)>(?P<title>.*?)</a>"#)
            .expect("title pattern is valid")
    })
}

fn snippet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?s)<(?P<tag>a|div|td)\s[^>]*\bresult__snippet\b[^>]*>(?P<snippet>.*?)</(?:a|div|td)>"#,
        )
        .expect("snippet pattern is valid")
    })
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"href="(?P<href>[^"]*)""#).expect("href pattern is valid"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// Extract hits from a DuckDuckGo HTML result page, in page order.
///
/// Sponsored results (`/y.js` links) and results without a usable http(s)
/// link are skipped.
pub fn parse_results(html: &str) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for block in html.split("result__body").skip(1) {
        let Some(caps) = title_pattern().captures(block) else {
            continue;
        };

        let Some(href) = href_pattern()
            .captures(&caps["attrs"])
            .map(|h| decode_entities(&h["href"]))
        else {
            continue;
        };

        let Some(link) = resolve_link(&href) else {
            continue;
        };

        let title = clean_text(&caps["title"]);
        if title.is_empty() {
            continue;
        }

        let snippet = snippet_pattern()
            .captures(block)
            .map(|s| clean_text(&s["snippet"]))
            .unwrap_or_default();

        hits.push(SearchHit::new(title, link, snippet));
    }

    hits
}

/// Turn a result href into the destination URL, unwrapping the `/l/?uddg=` redirect
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    let is_ddg = url
        .host_str()
        .map(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
        .unwrap_or(false);

    let target = if is_ddg {
        if url.path() == "/y.js" {
            return None;
        }
        let uddg = url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())?;
        Url::parse(&uddg).ok()?
    } else {
        url
    };

    match target.scheme() {
        "http" | "https" => Some(target.to_string()),
        _ => None,
    }
}

fn clean_text(fragment: &str) -> String {
    let stripped = tag_pattern().replace_all(fragment, "");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
