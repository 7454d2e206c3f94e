//! Security event records and context redaction.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Replacement for the value of a sensitive context key.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Severity of a [`SecurityEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Diagnostic detail.
    Debug,
    /// Routine audit record.
    #[default]
    Info,
    /// Rejected input or suspicious activity.
    Warn,
    /// Unexpected failure.
    Error,
}

impl EventLevel {
    /// Parses a level name, falling back to [`EventLevel::Info`] for
    /// anything unrecognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use locguard_core::audit::EventLevel;
    ///
    /// assert_eq!(EventLevel::parse_lenient("WARN"), EventLevel::Warn);
    /// assert_eq!(EventLevel::parse_lenient("warning"), EventLevel::Warn);
    /// assert_eq!(EventLevel::parse_lenient("loud"), EventLevel::Info);
    /// ```
    #[must_use]
    pub fn parse_lenient(level: &str) -> Self {
        match level.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" | "err" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Returns the lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityEvent {
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
    /// Normalized severity.
    pub level: EventLevel,
    /// Formatted message.
    pub message: String,
    /// Component that emitted the event.
    pub source: String,
    /// Redacted structured context.
    pub context: Map<String, Value>,
}

impl SecurityEvent {
    /// Builds an event stamped with the current time. The context is
    /// redacted before it is stored.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        level: EventLevel,
        source: impl Into<String>,
        context: Value,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            source: source.into(),
            context: into_context_map(redact(context)),
        }
    }
}

fn into_context_map(context: Value) -> Map<String, Value> {
    match context {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Replaces the value of every sensitive key, recursing into nested objects
/// and arrays.
///
/// # Examples
///
/// ```
/// use locguard_core::audit::redact;
/// use serde_json::json;
///
/// let redacted = redact(json!({ "user": "ana", "auth": { "Password": "hunter2" } }));
/// assert_eq!(redacted, json!({ "user": "ana", "auth": { "Password": "[REDACTED]" } }));
/// ```
#[must_use]
pub fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if is_sensitive_key(&key) {
                        (key, Value::String(REDACTION_MARKER.to_string()))
                    } else {
                        (key, redact(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        other => other,
    }
}

/// Returns `true` for keys naming a password or PIN.
///
/// `password`/`passwd` match anywhere in the key. `pin` must be a whole word
/// (`pin`, `user_pin`, `userPin`) so keys like `spinner` or `mapping` are
/// left alone.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    if lowered.contains("password") || lowered.contains("passwd") {
        return true;
    }
    key_words(key).any(|word| word.eq_ignore_ascii_case("pin"))
}

fn key_words(key: &str) -> impl Iterator<Item = String> + '_ {
    key.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .flat_map(split_camel_case)
}

fn split_camel_case(part: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for c in part.chars() {
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
