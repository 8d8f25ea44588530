//! Plain-text and structured rendering of an [`AgentAnswer`]

use crate::agent::AgentAnswer;
use serde::{Deserialize, Serialize};

/// Section labels in display order
pub const SECTION_LABELS: [&str; 7] = [
    "EVENTS FOUND",
    "NEWS HIGHLIGHTS",
    "TOP RECOMMENDATIONS",
    "BUDGET-FRIENDLY OPTIONS",
    "FRIEND GROUP SUGGESTIONS",
    "SOURCES",
    "NOTES",
];

/// One labeled list of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    pub items: Vec<String>,
}

/// Collapse all whitespace runs to single spaces
fn one_line(item: &str) -> String {
    item.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The structured form used by interactive front ends
pub fn render_sections(answer: &AgentAnswer) -> Vec<Section> {
    let lists: [&Vec<String>; 7] = [
        &answer.events_found,
        &answer.news_highlights,
        &answer.recommendations,
        &answer.budget_friendly_options,
        &answer.friend_group_suggestions,
        &answer.sources,
        &answer.notes,
    ];

    SECTION_LABELS
        .iter()
        .zip(lists)
        .map(|(label, items)| Section {
            label: label.to_string(),
            items: items
                .iter()
                .map(|item| one_line(item))
                .filter(|item| !item.is_empty())
                .collect(),
        })
        .collect()
}

/// Flat text block used for export and the console
pub fn render_text(answer: &AgentAnswer) -> String {
    let mut out = String::new();
    out.push_str(&format!("Query: {}\n", one_line(&answer.query)));
    out.push_str(&format!("City: {}\n\n", one_line(&answer.city)));

    out.push_str("SUMMARY\n");
    if answer.summary.trim().is_empty() {
        out.push_str("  (none)\n");
    } else {
        for line in answer.summary.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    for section in render_sections(answer) {
        out.push('\n');
        out.push_str(&format!("{} ({})\n", section.label, section.items.len()));
        if section.items.is_empty() {
            out.push_str("  (none)\n");
        }
        for (index, item) in section.items.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", index + 1, item));
        }
    }

    out.push('\n');
    let tools = if answer.tools_used.is_empty() {
        "none".to_string()
    } else {
        answer.tools_used.join(", ")
    };
    out.push_str(&format!("Tools used: {}\n", tools));
    out
}

fn section_header(line: &str) -> Option<&'static str> {
    let (label, count) = line.rsplit_once(" (")?;
    count.strip_suffix(')')?.parse::<usize>().ok()?;
    SECTION_LABELS.iter().copied().find(|known| *known == label)
}

/// Recover the labeled sections from text produced by [`render_text`]
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
        if let Some(label) = section_header(line) {
            sections.push(Section {
                label: label.to_string(),
                items: Vec::new(),
            });
            continue;
        }
        if line.starts_with("Tools used:") {
            break;
        }
        let Some(current) = sections.last_mut() else {
            continue;
        };
        let Some(rest) = line.strip_prefix("  ") else {
            continue;
        };
        if let Some((number, item)) = rest.split_once(". ") {
            if number.parse::<usize>().is_ok() {
                current.items.push(item.to_string());
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> AgentAnswer {
        AgentAnswer {
            query: "Find jazz events in Melbourne Australia".to_string(),
            city: "Melbourne".to_string(),
            summary: "Plenty of jazz this week.\n\nMost gigs are in the CBD.".to_string(),
            events_found: vec![
                "Jazz at Bird's Basement - $35".to_string(),
                "Free jazz\nin the park".to_string(),
            ],
            news_highlights: vec![],
            recommendations: vec!["Go early. 2. Bring friends".to_string()],
            budget_friendly_options: vec!["Free jazz in the park".to_string()],
            friend_group_suggestions: vec!["Music lovers: live sets".to_string()],
            sources: vec!["https://example.com/jazz".to_string()],
            tools_used: vec!["search_events".to_string(), "filter_by_budget".to_string()],
            notes: vec![],
        }
    }

    #[test]
    fn test_text_and_structured_forms_agree() {
        let answer = answer();
        let text = render_text(&answer);
        assert_eq!(parse_sections(&text), render_sections(&answer));
    }

    #[test]
    fn test_text_layout() {
        let text = render_text(&answer());
        assert!(text.starts_with("Query: Find jazz events in Melbourne Australia\nCity: Melbourne\n"));
        assert!(text.contains("SUMMARY\n  Plenty of jazz this week.\n"));
        assert!(text.contains("EVENTS FOUND (2)\n  1. Jazz at Bird's Basement - $35\n  2. Free jazz in the park\n"));
        assert!(text.contains("NEWS HIGHLIGHTS (0)\n  (none)\n"));
        assert!(text.trim_end().ends_with("Tools used: search_events, filter_by_budget"));
    }

    #[test]
    fn test_sections_follow_label_order() {
        let labels: Vec<_> = render_sections(&answer()).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, SECTION_LABELS);
    }

    #[test]
    fn test_summary_cannot_fake_a_section() {
        let mut answer = answer();
        answer.summary = "EVENTS FOUND (9)\n  1. not an event".to_string();
        let text = render_text(&answer);
        assert_eq!(parse_sections(&text), render_sections(&answer));
    }
}
