//! Budget filter tool

use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::search::SearchHit;
use crate::tools::{Tool, ToolCall, ToolContext, ToolExample, ToolKind, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const DESCRIPTION: &str = "Keep only the records whose price is at or under max_price. Free records \
     always fit; records with no known price are dropped. Pass records exactly as returned by \
     search_events (title, link, snippet, price).";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterBudgetArgs {
    records: Vec<SearchHit>,
    max_price: f64,
}

/// Subset of `hits` whose price fits under `ceiling`, original order kept.
///
/// Records without an explicit price get one derived from their text first.
pub fn filter_by_budget(hits: &[SearchHit], ceiling: f64) -> std::result::Result<Vec<SearchHit>, ToolError> {
    if !ceiling.is_finite() || ceiling < 0.0 {
        return Err(ToolError::invalid_argument(format!(
            "max_price must be a non-negative number, got {}",
            ceiling
        )));
    }

    Ok(hits
        .iter()
        .cloned()
        .map(SearchHit::with_derived_price)
        .filter(|hit| hit.price.fits_budget(ceiling))
        .collect())
}

pub struct FilterBudgetTool {
    currency: String,
}

impl FilterBudgetTool {
    pub fn new(context: &ToolContext) -> Self {
        Self {
            currency: context.locale.currency.clone(),
        }
    }
}

#[async_trait]
impl Tool for FilterBudgetTool {
    fn kind(&self) -> ToolKind {
        ToolKind::FilterByBudget
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "records": {
                    "type": "array",
                    "description": "Records to filter",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "link": {"type": "string"},
                            "snippet": {"type": "string"},
                            "price": {
                                "description": "\"free\", a number, or null when unknown",
                                "type": ["string", "number", "null"]
                            }
                        },
                        "required": ["title", "link"]
                    }
                },
                "max_price": {
                    "type": "number",
                    "minimum": 0,
                    "description": format!("Budget ceiling in {}. 0 keeps only free records.", self.currency)
                }
            },
            "required": ["records", "max_price"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: FilterBudgetArgs = call.parse_arguments()?;
        let kept = filter_by_budget(&args.records, args.max_price)?;

        tracing::debug!(
            max_price = args.max_price,
            total = args.records.len(),
            kept = kept.len(),
            "Applied budget filter"
        );

        let output = json!({
            "max_price": args.max_price,
            "currency": self.currency,
            "kept": kept,
            "removed": args.records.len() - kept.len(),
        });
        ToolResult::json(&call.id, &output)
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Keep only free events".to_string(),
            parameters: json!({
                "records": [
                    {"title": "Jazz in the park", "link": "https://example.com/jazz", "price": "free"},
                    {"title": "Club night", "link": "https://example.com/club", "price": 35}
                ],
                "max_price": 0
            }),
            expected_result: "Only the jazz record is kept".to_string(),
        }]
    }
}

impl_tool_factory!(
    FilterBudgetToolFactory,
    FilterBudgetTool,
    ToolKind::FilterByBudget,
    DESCRIPTION
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Price;

    fn hit(title: &str, price: Price) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
            snippet: String::new(),
            price,
        }
    }

    fn titles(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.title.as_str()).collect()
    }

    #[test]
    fn test_zero_budget_keeps_only_free_in_order() {
        let hits = vec![
            hit("Free jazz A", Price::Free),
            hit("Paid jazz", Price::Amount(40.0)),
            hit("Mystery gig", Price::Unknown),
            hit("Free jazz B", Price::Free),
            hit("Cheap jazz", Price::Amount(5.0)),
        ];

        let kept = filter_by_budget(&hits, 0.0).unwrap();
        assert_eq!(titles(&kept), vec!["Free jazz A", "Free jazz B"]);
    }

    #[test]
    fn test_ceiling_is_inclusive_and_subset_is_exact() {
        let hits = vec![
            hit("A", Price::Amount(50.0)),
            hit("B", Price::Amount(50.5)),
            hit("C", Price::Free),
            hit("D", Price::Amount(10.0)),
        ];

        for ceiling in [0.0, 10.0, 49.99, 50.0, 100.0] {
            let kept = filter_by_budget(&hits, ceiling).unwrap();
            let expected: Vec<&str> = hits
                .iter()
                .filter(|h| match h.price {
                    Price::Free => true,
                    Price::Amount(a) => a <= ceiling,
                    Price::Unknown => false,
                })
                .map(|h| h.title.as_str())
                .collect();
            assert_eq!(titles(&kept), expected, "ceiling {}", ceiling);
        }
    }

    #[test]
    fn test_unknown_price_is_derived_from_text() {
        let mut record = hit("Comedy", Price::Unknown);
        record.snippet = "Tickets $20 at the door".to_string();

        let kept = filter_by_budget(&[record], 25.0).unwrap();
        assert_eq!(kept[0].price, Price::Amount(20.0));
    }

    #[test]
    fn test_zero_budget_drops_paid_event_with_free_extras() {
        let records = vec![
            SearchHit::new(
                "Rooftop concert",
                "https://example.com/rooftop",
                "Tickets $40, free parking on site",
            ),
            SearchHit::new(
                "Gluten free food festival",
                "https://example.com/gf",
                "Entry $25",
            ),
            SearchHit::new(
                "Jazz on the lawn",
                "https://example.com/lawn",
                "Free entry, food trucks from $12",
            ),
        ];

        let kept = filter_by_budget(&records, 0.0).unwrap();
        assert_eq!(titles(&kept), vec!["Jazz on the lawn"]);

        let kept = filter_by_budget(&records, 30.0).unwrap();
        assert_eq!(titles(&kept), vec!["Gluten free food festival", "Jazz on the lawn"]);
    }

    #[test]
    fn test_negative_ceiling_is_rejected() {
        assert!(filter_by_budget(&[], -1.0).is_err());
        assert!(filter_by_budget(&[], f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_execute_with_model_supplied_records() {
        let tool = FilterBudgetTool {
            currency: "AUD".to_string(),
        };
        let call = ToolCall::new(
            "filter_by_budget",
            json!({
                "records": [
                    {"title": "Free jazz", "link": "https://a.example", "price": "free"},
                    {"title": "Gig", "link": "https://b.example", "snippet": "$30 entry"}
                ],
                "max_price": 0
            }),
        );

        let result = tool.execute(call).await.unwrap();
        let body: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(body["kept"].as_array().unwrap().len(), 1);
        assert_eq!(body["kept"][0]["title"], "Free jazz");
        assert_eq!(body["removed"], 1);
    }
}
