//! Export document and file writer

use crate::config::Locale;
use crate::error::{Result, ToolError};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 70;

/// `<city-slug>_events_<YYYY-MM-DD_HH-MM-SS>.txt`
pub fn export_filename(locale: &Locale, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_events_{}.txt",
        locale.city_slug(),
        timestamp.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Wrap a rendered answer in the export banner and source footer
pub fn render_export_document(locale: &Locale, body: &str, timestamp: &NaiveDateTime) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let title = format!(
        "{} EVENT AND NEWS DISCOVERY RESULTS",
        locale.city.to_uppercase()
    );
    let city = &locale.city;

    let mut doc = String::new();
    doc.push_str(&rule);
    doc.push('\n');
    doc.push_str(format!("{:^width$}", title, width = RULE_WIDTH).trim_end());
    doc.push('\n');
    doc.push_str(&rule);
    doc.push('\n');
    doc.push_str(&format!("Generated: {}\n", timestamp.format("%Y-%m-%d %H:%M:%S")));
    doc.push_str(&format!(
        "Location: {}, {}, {}\n\n",
        locale.city, locale.region, locale.country
    ));
    doc.push_str(body.trim_end());
    doc.push_str("\n\n");
    doc.push_str(&rule);
    doc.push('\n');
    doc.push_str(
        "Note: Please verify event details and news on official sources before relying on this information.\n\n",
    );
    doc.push_str(&format!("Recommended {} event sources:\n", city));
    for source in [
        format!("TimeOut {}", city),
        format!("Eventbrite {}", city),
        format!("What's On {}", city),
        "The Age (local newspaper)".to_string(),
        "Herald Sun (local newspaper)".to_string(),
    ] {
        doc.push_str(&format!("- {}\n", source));
    }
    doc.push_str(&rule);
    doc.push('\n');
    doc
}

/// Accept a bare file name only, adding `.txt` when missing
pub fn sanitize_filename(name: &str) -> std::result::Result<String, ToolError> {
    let name = name.trim();
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
        || name.chars().any(char::is_control)
    {
        return Err(ToolError::invalid_argument(format!(
            "filename must be a bare file name, got '{}'",
            name
        )));
    }

    if name.to_lowercase().ends_with(".txt") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.txt", name))
    }
}

/// Write `contents` to `dir/filename`, creating `dir` if needed
pub async fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, contents).await?;
    tracing::info!(path = %path.display(), "Results saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentAnswer;
    use crate::output::{parse_sections, render_sections, render_text};
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(&Locale::default(), &timestamp()),
            "melbourne_events_2026-02-14_09-05-07.txt"
        );
    }

    #[test]
    fn test_document_banner_and_footer() {
        let doc = render_export_document(&Locale::default(), "SUMMARY\n  hello\n", &timestamp());

        assert!(doc.contains("MELBOURNE EVENT AND NEWS DISCOVERY RESULTS"));
        assert!(doc.contains("Generated: 2026-02-14 09:05:07"));
        assert!(doc.contains("Location: Melbourne, Victoria, Australia"));
        assert!(doc.contains("SUMMARY\n  hello\n\n"));
        assert!(doc.contains("- TimeOut Melbourne"));
        assert!(doc.contains("- Herald Sun (local newspaper)"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("weekend").unwrap(), "weekend.txt");
        assert_eq!(sanitize_filename("plan.TXT").unwrap(), "plan.TXT");
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("a/b.txt").is_err());
        assert!(sanitize_filename(".hidden").is_err());
        assert!(sanitize_filename("  ").is_err());
    }

    #[tokio::test]
    async fn test_write_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");

        let path = write_export(&target, "out.txt", "content").await.unwrap();

        assert_eq!(path, target.join("out.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "content");
    }

    #[tokio::test]
    async fn test_saved_file_keeps_every_section() {
        let answer = AgentAnswer {
            query: "Find comedy events and news about trams in Melbourne".to_string(),
            city: "Melbourne".to_string(),
            summary: "Two shows tonight.\n\n1. Not a list item".to_string(),
            events_found: vec![
                "Comedy at The Forum - $25".to_string(),
                "Open mic\nnight (free)".to_string(),
            ],
            news_highlights: vec!["Route 96 works finish early".to_string()],
            recommendations: vec![],
            budget_friendly_options: vec!["Open mic night (free)".to_string()],
            friend_group_suggestions: vec!["Big groups: book ahead".to_string()],
            sources: vec!["https://example.com/comedy".to_string()],
            tools_used: vec!["search_events".to_string(), "search_news".to_string()],
            notes: vec!["Prices checked today".to_string()],
        };
        let locale = Locale::default();
        let doc = render_export_document(&locale, &render_text(&answer), &timestamp());
        let dir = tempfile::tempdir().unwrap();

        let path = write_export(dir.path(), &export_filename(&locale, &timestamp()), &doc)
            .await
            .unwrap();
        let saved = tokio::fs::read_to_string(&path).await.unwrap();

        assert_eq!(parse_sections(&saved), render_sections(&answer));
    }
}
