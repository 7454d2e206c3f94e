//! Security event logging.
//!
//! Every rejected candidate and unexpected failure is recorded as a
//! [`SecurityEvent`]: a timestamped, source-tagged record whose context has
//! passwords and PINs redacted. Events are emitted through `tracing` under
//! the [`AUDIT_TARGET`] target and can also be appended to a
//! [`RotatingFileSink`].

pub mod event;
pub mod logger;
pub mod sink;

use std::sync::Arc;
use std::sync::OnceLock;

pub use event::EventLevel;
pub use event::REDACTION_MARKER;
pub use event::SecurityEvent;
pub use event::is_sensitive_key;
pub use event::redact;
pub use logger::AUDIT_TARGET;
pub use logger::DEFAULT_SOURCE;
pub use logger::SecurityLogger;
pub use sink::RotatingFileSink;

static DEFAULT_LOGGER: OnceLock<Arc<SecurityLogger>> = OnceLock::new();

/// Returns the process-wide logger used by the free-function API.
///
/// Unless [`install_default_logger`] ran first, this is a plain
/// [`SecurityLogger`] tagged [`DEFAULT_SOURCE`].
#[must_use]
pub fn default_logger() -> Arc<SecurityLogger> {
    Arc::clone(DEFAULT_LOGGER.get_or_init(|| Arc::new(SecurityLogger::default())))
}

/// Installs the process-wide logger.
///
/// # Errors
///
/// Returns the logger back if a default logger was already installed or
/// already used.
pub fn install_default_logger(logger: SecurityLogger) -> Result<(), SecurityLogger> {
    DEFAULT_LOGGER
        .set(Arc::new(logger))
        .map_err(|rejected| Arc::try_unwrap(rejected).unwrap_or_default())
}
