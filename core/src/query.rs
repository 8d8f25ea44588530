//! User search requests
//!
//! A [`SearchQuery`] is built once per interaction from what the user typed,
//! validated up front, and turned into the natural-language request that
//! opens the conversation with the model.

use crate::config::Locale;
use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user wants to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    Events,
    News,
    Both,
}

impl SearchCategory {
    pub const ALL: [SearchCategory; 3] = [
        SearchCategory::Events,
        SearchCategory::News,
        SearchCategory::Both,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::Events => "events",
            SearchCategory::News => "news",
            SearchCategory::Both => "both",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchCategory::Events => "Events",
            SearchCategory::News => "News",
            SearchCategory::Both => "Both",
        }
    }

    pub fn wants_events(&self) -> bool {
        matches!(self, SearchCategory::Events | SearchCategory::Both)
    }

    pub fn wants_news(&self) -> bool {
        matches!(self, SearchCategory::News | SearchCategory::Both)
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCategory {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "events" | "event" | "1" => Ok(SearchCategory::Events),
            "news" | "2" => Ok(SearchCategory::News),
            "both" | "3" => Ok(SearchCategory::Both),
            other => Err(QueryError::UnknownCategory {
                value: other.to_string(),
            }),
        }
    }
}

/// A validated, immutable search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub category: SearchCategory,
    /// Free-text event interests, present for events and both
    pub interests: Option<String>,
    /// News topic, present for news and both
    pub news_topic: Option<String>,
    /// Budget ceiling in local currency; `None` means any price
    pub budget: Option<f64>,
}

impl SearchQuery {
    /// Validate raw inputs for the given category.
    ///
    /// Inputs the category does not use are dropped, so a news query never
    /// carries a budget.
    pub fn new(
        category: SearchCategory,
        interests: Option<&str>,
        news_topic: Option<&str>,
        budget: Option<f64>,
    ) -> Result<Self, QueryError> {
        let interests = if category.wants_events() {
            Some(non_empty(interests).ok_or(QueryError::MissingInterests)?)
        } else {
            None
        };

        let news_topic = if category.wants_news() {
            Some(non_empty(news_topic).ok_or(QueryError::MissingNewsTopic)?)
        } else {
            None
        };

        let budget = if category.wants_events() {
            match budget {
                Some(value) if !value.is_finite() || value < 0.0 => {
                    return Err(QueryError::InvalidBudget {
                        value: value.to_string(),
                    })
                }
                other => other,
            }
        } else {
            None
        };

        Ok(Self {
            category,
            interests,
            news_topic,
            budget,
        })
    }

    pub fn events(interests: &str, budget: Option<f64>) -> Result<Self, QueryError> {
        Self::new(SearchCategory::Events, Some(interests), None, budget)
    }

    pub fn news(topic: &str) -> Result<Self, QueryError> {
        Self::new(SearchCategory::News, None, Some(topic), None)
    }

    pub fn both(interests: &str, topic: &str, budget: Option<f64>) -> Result<Self, QueryError> {
        Self::new(SearchCategory::Both, Some(interests), Some(topic), budget)
    }

    /// Render the request sent to the model as the user turn
    pub fn to_prompt(&self, locale: &Locale) -> String {
        let place = format!("{} {}", locale.city, locale.country);
        let interests = self.interests.as_deref().unwrap_or_default();
        let topic = self.news_topic.as_deref().unwrap_or_default();
        let budget = self
            .budget
            .map(|b| format!(" with budget under ${} {}", format_amount(b), locale.currency))
            .unwrap_or_default();

        match self.category {
            SearchCategory::Events => format!("Find {} events in {}{}", interests, place, budget),
            SearchCategory::News => {
                format!("Find latest news about {} in {}", topic, place)
            }
            SearchCategory::Both if self.budget.is_some() => format!(
                "Find {} events in {}{} and also provide latest {} news in {}",
                interests, place, budget, topic, locale.city
            ),
            SearchCategory::Both => format!(
                "Find {} events and latest {} news in {}",
                interests, topic, place
            ),
        }
    }
}

/// Parse a budget as typed by a user: blank means any, `$` and currency
/// suffixes are tolerated.
pub fn parse_budget(input: &str) -> Result<Option<f64>, QueryError> {
    let cleaned = input
        .trim()
        .trim_start_matches('$')
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .replace(',', "");

    if cleaned.is_empty() && !input.trim().chars().any(|c| c.is_ascii_alphanumeric()) {
        return Ok(None);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(QueryError::InvalidBudget {
            value: input.trim().to_string(),
        }),
    }
}

/// `50` for whole amounts, `12.50` otherwise
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_prompt_with_budget() {
        let query = SearchQuery::events("  jazz ", Some(50.0)).unwrap();
        assert_eq!(
            query.to_prompt(&Locale::default()),
            "Find jazz events in Melbourne Australia with budget under $50 AUD"
        );
    }

    #[test]
    fn test_both_prompts() {
        let locale = Locale::default();
        let with_budget = SearchQuery::both("tech meetup", "transport", Some(0.0)).unwrap();
        assert_eq!(
            with_budget.to_prompt(&locale),
            "Find tech meetup events in Melbourne Australia with budget under $0 AUD and also provide latest transport news in Melbourne"
        );

        let any_price = SearchQuery::both("comedy", "weather", None).unwrap();
        assert_eq!(
            any_price.to_prompt(&locale),
            "Find comedy events and latest weather news in Melbourne Australia"
        );
    }

    #[test]
    fn test_news_query_drops_budget() {
        let query = SearchQuery::new(SearchCategory::News, Some("jazz"), Some("sport"), Some(20.0))
            .unwrap();
        assert_eq!(query.interests, None);
        assert_eq!(query.budget, None);
        assert_eq!(
            query.to_prompt(&Locale::default()),
            "Find latest news about sport in Melbourne Australia"
        );
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            SearchQuery::events("   ", None).unwrap_err(),
            QueryError::MissingInterests
        );
        assert_eq!(SearchQuery::news("").unwrap_err(), QueryError::MissingNewsTopic);
        assert!(matches!(
            SearchQuery::events("jazz", Some(-5.0)),
            Err(QueryError::InvalidBudget { .. })
        ));
    }

    #[test]
    fn test_parse_budget() {
        assert_eq!(parse_budget("").unwrap(), None);
        assert_eq!(parse_budget("  ").unwrap(), None);
        assert_eq!(parse_budget("50").unwrap(), Some(50.0));
        assert_eq!(parse_budget("$1,200 AUD").unwrap(), Some(1200.0));
        assert_eq!(parse_budget("0").unwrap(), Some(0.0));
        assert!(parse_budget("cheap").is_err());
        assert!(parse_budget("-10").is_err());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Both".parse::<SearchCategory>().unwrap(), SearchCategory::Both);
        assert_eq!("2".parse::<SearchCategory>().unwrap(), SearchCategory::News);
        assert!("sports".parse::<SearchCategory>().is_err());
    }
}
