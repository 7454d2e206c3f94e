//! Audit event emission.

use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;

use serde_json::Value;

use super::EventLevel;
use super::RotatingFileSink;
use super::SecurityEvent;

/// Tracing target of every audit event.
pub const AUDIT_TARGET: &str = "locguard_core::audit";

/// Source tag used when none is configured.
pub const DEFAULT_SOURCE: &str = "locguard";

type MessageFormatter = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Emits [`SecurityEvent`]s through `tracing` and, optionally, a rotating
/// JSON-lines file.
///
/// Logging never fails: a formatter returning `None` falls back to the raw
/// message, and sink errors are reported through `tracing` only.
///
/// # Examples
///
/// ```
/// use locguard_core::audit::EventLevel;
/// use locguard_core::audit::SecurityLogger;
/// use serde_json::json;
///
/// let logger = SecurityLogger::new("scanner")
///     .with_formatter(|key| (key == "path.rejected").then(|| "Path rejected".to_string()));
///
/// let event = logger.log("path.rejected", EventLevel::Warn, json!({ "pin": "0000" }));
/// assert_eq!(event.message, "Path rejected");
/// assert_eq!(event.context["pin"], "[REDACTED]");
/// ```
pub struct SecurityLogger {
    source: String,
    formatter: Option<Box<MessageFormatter>>,
    sink: Option<RotatingFileSink>,
}

impl SecurityLogger {
    /// Creates a logger tagging events with `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            formatter: None,
            sink: None,
        }
    }

    /// Sets a message formatter, typically a translation lookup.
    ///
    /// A formatter that returns `None` or panics leaves the message as
    /// given. Builds with `panic = "abort"` cannot recover from the panic,
    /// so formatters should not panic.
    #[must_use]
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Additionally appends every event to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: RotatingFileSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the source tag.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Builds, emits and returns an event.
    pub fn log(&self, message: &str, level: EventLevel, context: Value) -> SecurityEvent {
        let event = SecurityEvent::new(self.format(message), level, self.source.as_str(), context);
        self.emit(&event);
        event
    }

    /// Like [`log`](Self::log) with a free-form level name.
    pub fn log_with_level_name(&self, message: &str, level: &str, context: Value) -> SecurityEvent {
        self.log(message, EventLevel::parse_lenient(level), context)
    }

    fn format(&self, message: &str) -> String {
        let Some(formatter) = &self.formatter else {
            return message.to_string();
        };
        match panic::catch_unwind(AssertUnwindSafe(|| formatter(message))) {
            Ok(Some(formatted)) => formatted,
            Ok(None) => message.to_string(),
            Err(_) => {
                tracing::error!(target: AUDIT_TARGET, "message formatter panicked");
                message.to_string()
            }
        }
    }

    fn emit(&self, event: &SecurityEvent) {
        let context = Value::Object(event.context.clone());
        let source = event.source.as_str();
        let message = event.message.as_str();
        match event.level {
            EventLevel::Debug => {
                tracing::debug!(target: AUDIT_TARGET, source, %context, "{message}");
            }
            EventLevel::Info => {
                tracing::info!(target: AUDIT_TARGET, source, %context, "{message}");
            }
            EventLevel::Warn => {
                tracing::warn!(target: AUDIT_TARGET, source, %context, "{message}");
            }
            EventLevel::Error => {
                tracing::error!(target: AUDIT_TARGET, source, %context, "{message}");
            }
        }

        if let Some(sink) = &self.sink
            && let Err(e) = sink.append(event)
        {
            tracing::error!(
                target: AUDIT_TARGET,
                path = %sink.path().display(),
                error = %e,
                "failed to append to audit log"
            );
        }
    }
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

impl fmt::Debug for SecurityLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityLogger")
            .field("source", &self.source)
            .field("formatter", &self.formatter.is_some())
            .field("sink", &self.sink)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    #[test]
    fn test_default_source() {
        let logger = SecurityLogger::default();
        let event = logger.log("hello", EventLevel::Info, Value::Null);
        assert_eq!(event.source, DEFAULT_SOURCE);
        assert_eq!(event.message, "hello");
    }

    #[test]
    fn test_formatter_fallback() {
        let logger = SecurityLogger::new("t").with_formatter(|_| None);
        let event = logger.log("raw.key", EventLevel::Info, Value::Null);
        assert_eq!(event.message, "raw.key");
    }

    #[test]
    fn test_panicking_formatter_falls_back() {
        let logger = SecurityLogger::new("t").with_formatter(|key| {
            assert!(key != "boom.key", "translation table missing");
            Some(key.to_uppercase())
        });

        let event = logger.log("boom.key", EventLevel::Warn, json!({ "a": 1 }));
        assert_eq!(event.message, "boom.key");
        assert_eq!(event.level, EventLevel::Warn);

        let event = logger.log("ok.key", EventLevel::Info, Value::Null);
        assert_eq!(event.message, "OK.KEY");
    }

    #[test]
    fn test_level_name_normalized() {
        let logger = SecurityLogger::new("t");
        assert_eq!(
            logger.log_with_level_name("m", "WARNING", Value::Null).level,
            EventLevel::Warn
        );
        assert_eq!(
            logger.log_with_level_name("m", "bogus", Value::Null).level,
            EventLevel::Info
        );
    }

    #[test]
    #[traced_test]
    fn test_emits_through_tracing_with_redaction() {
        let logger = SecurityLogger::new("audit-test");
        logger.log(
            "credential check",
            EventLevel::Warn,
            json!({ "password": "hunter2", "user": "ana" }),
        );

        assert!(logs_contain("credential check"));
        assert!(logs_contain("[REDACTED]"));
        assert!(!logs_contain("hunter2"));
    }

    #[test]
    fn test_sink_receives_events() {
        let temp = TempDir::new().unwrap();
        let sink = RotatingFileSink::new(temp.path().join("audit.log"), 0, 1).unwrap();
        let logger = SecurityLogger::new("t").with_sink(sink);

        logger.log("to file", EventLevel::Error, json!({ "pin": 1 }));

        let content = std::fs::read_to_string(temp.path().join("audit.log")).unwrap();
        let parsed: Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["message"], json!("to file"));
        assert_eq!(parsed["level"], json!("error"));
        assert_eq!(parsed["context"]["pin"], json!("[REDACTED]"));
    }
}
