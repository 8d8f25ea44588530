//! System prompt and user message construction

use crate::config::Locale;
use crate::query::SearchQuery;
use crate::tools::ToolKind;

/// Friend-group pairings offered to the model, by event type
pub const FRIEND_GROUP_HINTS: &[(&str, &str)] = &[
    ("Tech meetups", "Tech-savvy friends, colleagues, aspiring developers"),
    ("Concerts/Music", "Music lovers, party friends, concert buddies"),
    ("Food festivals", "Foodies, family, casual friend groups"),
    ("Art exhibitions", "Creative friends, art enthusiasts"),
    ("Sports events (AFL, cricket, tennis)", "Sports fans, active friends"),
    ("Networking events", "Professional contacts, entrepreneurs"),
    ("Comedy shows", "Friends with similar humor, casual groups"),
    ("Markets", "Shopping buddies, family, friends who love local goods"),
];

const ANSWER_FORMAT: &str = r#"When you have gathered enough information, stop calling tools and reply with a single JSON object and nothing else:
{
  "summary": "two or three sentences answering the request",
  "events_found": ["event name - date - venue - price - link"],
  "news_highlights": ["headline - date - source - link"],
  "recommendations": ["your top picks and why"],
  "budget_friendly_options": ["free or cheap options within the budget"],
  "friend_group_suggestions": ["event -> which friends to invite"],
  "sources": ["title - link"]
}
Use empty lists for sections that do not apply. Only use links that appeared in tool results; never make up URLs."#;

fn tool_usage_line(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::SearchEvents => "Search for events with search_events (give it the interest and, if known, the budget)",
        ToolKind::SearchNews => "Search for news with search_news",
        ToolKind::FilterByBudget => {
            "Keep only events within the budget with filter_by_budget (pass the event records you received)"
        }
        ToolKind::SaveResults => "Save a text summary with save_results, only when the user asks for a file",
    }
}

/// The default system prompt for a locale and the tools on offer
pub fn build_system_prompt(locale: &Locale, tools: &[ToolKind]) -> String {
    let mut prompt = format!(
        "You are an intelligent Local Event and News Discovery Assistant for {city}, {country}.\n\n\
         Your mission:\n\
         1. Search for events and news based on user interests (concerts, meetups, festivals, local news, etc.)\n\
         2. Identify budget-friendly and free options (prices are in {currency})\n\
         3. Organize events by date and relevance\n\
         4. Provide news highlights relevant to {city}\n\
         5. Suggest which friend groups to invite based on event type\n\n\
         When suggesting friend groups, consider:\n",
        city = locale.city,
        country = locale.country,
        currency = locale.currency,
    );

    for (event_type, groups) in FRIEND_GROUP_HINTS {
        prompt.push_str(&format!("- {} -> {}\n", event_type, groups));
    }

    prompt.push_str(&format!(
        "\nFor news queries:\n\
         - Search for relevant {city} and {region} news\n\
         - Summarize key points\n\
         - Include dates and sources when available\n",
        city = locale.city,
        region = locale.region,
    ));

    if !tools.is_empty() {
        prompt.push_str("\nUse the available tools to:\n");
        for (index, kind) in tools.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", index + 1, tool_usage_line(*kind)));
        }
        prompt.push_str(
            "If a tool reports an error, you may retry once with different arguments; \
             otherwise say that no results were found for that part.\n",
        );
    }

    prompt.push('\n');
    prompt.push_str(ANSWER_FORMAT);
    prompt
}

/// A custom system prompt still carries the answer format the loop parses
pub fn build_custom_system_prompt(custom: &str) -> String {
    format!("{}\n\n{}", custom.trim(), ANSWER_FORMAT)
}

/// The first user turn for a query
pub fn build_user_message(query: &SearchQuery, locale: &Locale) -> String {
    query.to_prompt(locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_mentions_locale_and_tools() {
        let prompt = build_system_prompt(&Locale::default(), &ToolKind::ALL);
        assert!(prompt.contains("Melbourne, Australia"));
        assert!(prompt.contains("Melbourne and Victoria news"));
        assert!(prompt.contains("Markets -> Shopping buddies"));
        assert!(prompt.contains("search_events"));
        assert!(prompt.contains("filter_by_budget"));
        assert!(prompt.contains("never make up URLs"));
    }

    #[test]
    fn test_prompt_only_lists_offered_tools() {
        let prompt = build_system_prompt(&Locale::default(), &[ToolKind::SearchNews]);
        assert!(prompt.contains("search_news"));
        assert!(!prompt.contains("with search_events"));
        assert!(!prompt.contains("save_results"));
    }

    #[test]
    fn test_custom_prompt_keeps_answer_format() {
        let prompt = build_custom_system_prompt("You are terse.");
        assert!(prompt.starts_with("You are terse."));
        assert!(prompt.contains("\"events_found\""));
    }
}
