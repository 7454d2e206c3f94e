//! Human-readable output formatter with colors and styling.

use super::formatter::CheckOutcome;
use super::formatter::OutputFormatter;
use super::formatter::StatReport;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn mark(&self, accepted: bool) -> String {
        match (accepted, self.use_colors) {
            (true, true) => style("✓").green().bold().to_string(),
            (false, true) => style("✗").red().bold().to_string(),
            (true, false) => "OK".to_string(),
            (false, false) => "REJECTED".to_string(),
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_check_results(&self, outcomes: &[CheckOutcome]) -> Result<()> {
        for outcome in outcomes {
            // Rejections are always shown, acceptances only without --quiet
            if outcome.accepted && self.quiet {
                continue;
            }

            let detail = if outcome.accepted {
                outcome.resolved.as_deref().unwrap_or_default()
            } else {
                outcome.error.as_deref().unwrap_or_default()
            };
            self.term.write_line(&format!(
                "{} {}: {detail}",
                self.mark(outcome.accepted),
                outcome.candidate
            ))?;

            if self.verbose {
                if let Some(relative) = &outcome.relative {
                    self.term.write_line(&format!("    relative: {relative}"))?;
                }
                if let Some(kind) = outcome.kind {
                    self.term.write_line(&format!("    kind: {kind}"))?;
                }
            }
        }
        Ok(())
    }

    fn format_content(&self, _path: &Path, content: &str) -> Result<()> {
        self.term.write_str(content)?;
        Ok(())
    }

    fn format_listing(&self, path: &Path, entries: &[String]) -> Result<()> {
        if self.verbose {
            self.term.write_line(&format!(
                "{} ({} entries)",
                path.display(),
                entries.len()
            ))?;
        }
        for entry in entries {
            self.term.write_line(entry)?;
        }
        Ok(())
    }

    fn format_stat(&self, stat: &StatReport) -> Result<()> {
        self.term.write_line(&format!("  Path:     {}", stat.path))?;
        self.term.write_line(&format!("  Type:     {}", stat.kind))?;
        self.term.write_line(&format!(
            "  Size:     {}",
            Self::format_size(stat.size)
        ))?;
        self.term
            .write_line(&format!("  Readonly: {}", stat.readonly))?;
        if self.verbose {
            if let Some(modified) = stat.modified_unix {
                self.term
                    .write_line(&format!("  Modified: {modified} (unix seconds)"))?;
            }
        }
        Ok(())
    }

    fn format_sanitized(&self, text: &str) -> Result<()> {
        self.term.write_line(text)?;
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:#}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:#}"));
        }
    }

    fn format_success(&self, _operation: &str, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(512), "512 B");
        assert_eq!(HumanFormatter::format_size(2048), "2.0 KB");
        assert_eq!(HumanFormatter::format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_mark_without_colors() {
        let formatter = HumanFormatter {
            verbose: false,
            quiet: false,
            use_colors: false,
            term: Term::stdout(),
            err_term: Term::stderr(),
        };
        assert_eq!(formatter.mark(true), "OK");
        assert_eq!(formatter.mark(false), "REJECTED");
    }
}
