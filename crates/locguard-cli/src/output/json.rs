//! JSON output formatter for machine-readable results.

use super::formatter::CheckOutcome;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::StatReport;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_check_results(&self, outcomes: &[CheckOutcome]) -> Result<()> {
        Self::output(&JsonOutput::success("check", outcomes))
    }

    fn format_content(&self, path: &Path, content: &str) -> Result<()> {
        #[derive(Serialize)]
        struct ContentOutput<'a> {
            path: String,
            content: &'a str,
        }

        let data = ContentOutput {
            path: path.display().to_string(),
            content,
        };
        Self::output(&JsonOutput::success("read", data))
    }

    fn format_listing(&self, path: &Path, entries: &[String]) -> Result<()> {
        #[derive(Serialize)]
        struct ListingOutput<'a> {
            path: String,
            entries: &'a [String],
        }

        let data = ListingOutput {
            path: path.display().to_string(),
            entries,
        };
        Self::output(&JsonOutput::success("ls", data))
    }

    fn format_stat(&self, stat: &StatReport) -> Result<()> {
        Self::output(&JsonOutput::success("stat", stat))
    }

    fn format_sanitized(&self, text: &str) -> Result<()> {
        #[derive(Serialize)]
        struct SanitizedOutput<'a> {
            text: &'a str,
        }

        Self::output(&JsonOutput::success("sanitize", SanitizedOutput { text }))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_success(&self, operation: &str, message: &str) {
        #[derive(Serialize)]
        struct SuccessData {
            message: String,
        }

        let output = JsonOutput::success(
            operation,
            SuccessData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_outcome_serialization() {
        let outcome = CheckOutcome {
            candidate: "../x".to_string(),
            accepted: false,
            resolved: None,
            relative: None,
            kind: Some("path_traversal"),
            error: Some("path traversal detected".to_string()),
        };

        let json = serde_json::to_value(JsonOutput::success("check", [outcome])).unwrap();
        assert_eq!(json["operation"], "check");
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"][0]["accepted"], false);
        assert!(json["data"][0].get("resolved").is_none());
    }
}
