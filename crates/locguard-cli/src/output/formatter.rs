//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the outcome of `check` for every candidate
    fn format_check_results(&self, outcomes: &[CheckOutcome]) -> Result<()>;

    /// Format file content returned by `read`
    fn format_content(&self, path: &Path, content: &str) -> Result<()>;

    /// Format directory entries returned by `ls`
    fn format_listing(&self, path: &Path, entries: &[String]) -> Result<()>;

    /// Format path metadata returned by `stat`
    fn format_stat(&self, stat: &StatReport) -> Result<()>;

    /// Format text returned by `sanitize`
    fn format_sanitized(&self, text: &str) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format success message
    fn format_success(&self, operation: &str, message: &str);
}

/// Validation outcome for one `check` candidate
#[derive(Debug, Serialize)]
pub struct CheckOutcome {
    pub candidate: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Metadata summary printed by `stat`
#[derive(Debug, Serialize)]
pub struct StatReport {
    pub path: String,
    pub kind: &'static str,
    pub size: u64,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_unix: Option<u64>,
}

impl StatReport {
    pub fn new(path: &Path, metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_dir() {
            "directory"
        } else if file_type.is_file() {
            "file"
        } else if file_type.is_symlink() {
            "symlink"
        } else {
            "other"
        };

        Self {
            path: path.display().to_string(),
            kind,
            size: metadata.len(),
            readonly: metadata.permissions().readonly(),
            modified_unix: metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|elapsed| elapsed.as_secs()),
        }
    }
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stat_report_for_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("en.json");
        std::fs::write(&file, "{}").unwrap();

        let report = StatReport::new(Path::new("en.json"), &std::fs::metadata(&file).unwrap());
        assert_eq!(report.kind, "file");
        assert_eq!(report.size, 2);
        assert_eq!(report.path, "en.json");
        assert!(report.modified_unix.is_some());
    }

    #[test]
    fn test_error_output_omits_data() {
        let output = JsonOutput::<()>::error("read", "boom");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
