//! Form and JSON request bodies

use scout_core::error::QueryError;
use scout_core::query::{format_amount, parse_budget};
use scout_core::{SearchCategory, SearchQuery};
use serde::{Deserialize, Serialize};

pub const BUDGET_MAX: u32 = 500;
pub const BUDGET_STEP: u32 = 10;
pub const BUDGET_DEFAULT: u32 = 50;

/// Fields posted by the search form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_type: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub news_topic: String,
    #[serde(default)]
    pub budget: String,
    /// Checkbox; present when ticked
    pub any_budget: Option<String>,
}

impl SearchForm {
    pub fn to_query(&self) -> Result<SearchQuery, QueryError> {
        let category: SearchCategory = self.search_type.parse()?;
        let budget = if self.any_budget.is_some() {
            None
        } else {
            parse_budget(&self.budget)?
        };
        SearchQuery::new(
            category,
            Some(self.event_type.as_str()),
            Some(self.news_topic.as_str()),
            budget,
        )
    }
}

/// Values the form is rendered with
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub events_checked: bool,
    pub news_checked: bool,
    pub both_checked: bool,
    pub event_type: String,
    pub news_topic: String,
    pub budget: String,
    pub any_budget: bool,
    pub budget_max: u32,
    pub budget_step: u32,
    pub currency: String,
}

impl FormView {
    pub fn blank(currency: &str) -> Self {
        Self {
            events_checked: true,
            news_checked: false,
            both_checked: false,
            event_type: String::new(),
            news_topic: String::new(),
            budget: BUDGET_DEFAULT.to_string(),
            any_budget: false,
            budget_max: BUDGET_MAX,
            budget_step: BUDGET_STEP,
            currency: currency.to_string(),
        }
    }

    /// Echo back what was posted so a rejected form keeps its values
    pub fn from_form(form: &SearchForm, currency: &str) -> Self {
        let category = form
            .search_type
            .parse::<SearchCategory>()
            .unwrap_or(SearchCategory::Events);
        let budget = parse_budget(&form.budget)
            .ok()
            .flatten()
            .map(|b| format_amount(b.min(BUDGET_MAX as f64)))
            .unwrap_or_else(|| BUDGET_DEFAULT.to_string());
        Self {
            events_checked: category == SearchCategory::Events,
            news_checked: category == SearchCategory::News,
            both_checked: category == SearchCategory::Both,
            event_type: form.event_type.clone(),
            news_topic: form.news_topic.clone(),
            budget,
            any_budget: form.any_budget.is_some(),
            ..Self::blank(currency)
        }
    }

    /// Pre-fill from a query that was just run
    pub fn from_query(query: &SearchQuery, currency: &str) -> Self {
        Self {
            events_checked: query.category == SearchCategory::Events,
            news_checked: query.category == SearchCategory::News,
            both_checked: query.category == SearchCategory::Both,
            event_type: query.interests.clone().unwrap_or_default(),
            news_topic: query.news_topic.clone().unwrap_or_default(),
            budget: query
                .budget
                .map(format_amount)
                .unwrap_or_else(|| BUDGET_DEFAULT.to_string()),
            any_budget: query.category.wants_events() && query.budget.is_none(),
            ..Self::blank(currency)
        }
    }
}

/// Body of `POST /api/search`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchRequest {
    #[serde(rename = "type")]
    pub category: SearchCategory,
    pub interests: Option<String>,
    pub topic: Option<String>,
    pub budget: Option<f64>,
}

impl ApiSearchRequest {
    pub fn to_query(&self) -> Result<SearchQuery, QueryError> {
        SearchQuery::new(
            self.category,
            self.interests.as_deref(),
            self.topic.as_deref(),
            self.budget,
        )
    }
}
