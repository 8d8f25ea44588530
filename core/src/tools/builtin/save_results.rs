//! Save-to-file tool

use crate::config::Locale;
use crate::error::{Result, ToolError};
use crate::impl_tool_factory;
use crate::output::export::{export_filename, render_export_document, sanitize_filename, write_export};
use crate::tools::{Tool, ToolCall, ToolContext, ToolExample, ToolKind, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

pub const DESCRIPTION: &str = "Save event and news information to a formatted text file in the output \
     directory. Returns the path written.";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SaveResultsArgs {
    text: String,
    #[serde(default)]
    filename: Option<String>,
}

pub struct SaveResultsTool {
    locale: Locale,
    output_dir: PathBuf,
}

impl SaveResultsTool {
    pub fn new(context: &ToolContext) -> Self {
        Self {
            locale: context.locale.clone(),
            output_dir: context.output_dir.clone(),
        }
    }
}

#[async_trait]
impl Tool for SaveResultsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SaveResults
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The event and news information to save"
                },
                "filename": {
                    "type": "string",
                    "description": "Optional bare file name; a timestamped name is used when omitted"
                }
            },
            "required": ["text"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args: SaveResultsArgs = call.parse_arguments()?;
        if args.text.trim().is_empty() {
            return Err(ToolError::invalid_argument("text must not be empty").into());
        }

        let now = chrono::Local::now().naive_local();
        let filename = match args.filename.as_deref() {
            Some(name) => sanitize_filename(name)?,
            None => export_filename(&self.locale, &now),
        };

        let document = render_export_document(&self.locale, &args.text, &now);
        let path = write_export(&self.output_dir, &filename, &document)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: self.name().to_string(),
                message: e.to_string(),
            })?;

        ToolResult::json(
            &call.id,
            &json!({
                "saved": true,
                "path": path.display().to_string(),
            }),
        )
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Save a summary of this weekend's events".to_string(),
            parameters: json!({"text": "EVENTS FOUND\n  1. Jazz in the park (free)"}),
            expected_result: "Path of the written text file".to_string(),
        }]
    }
}

impl_tool_factory!(
    SaveResultsToolFactory,
    SaveResultsTool,
    ToolKind::SaveResults,
    DESCRIPTION
);

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(dir: &std::path::Path) -> SaveResultsTool {
        SaveResultsTool {
            locale: Locale::default(),
            output_dir: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_saves_with_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(dir.path())
            .execute(ToolCall::new("save_results", json!({"text": "Jazz in the park"})))
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        let path = PathBuf::from(body["path"].as_str().unwrap());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("melbourne_events_"));
        assert!(name.ends_with(".txt"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Jazz in the park"));
        assert!(written.contains("Location: Melbourne, Victoria, Australia"));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(dir.path())
            .execute(ToolCall::new(
                "save_results",
                json!({"text": "x", "filename": "../escape.txt"}),
            ))
            .await
            .unwrap_err()
            .into_tool_error("save_results");
        assert_eq!(err.kind(), "invalid_argument");
    }
}
