//! Error types for guarded file-system access.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `SecurityError`.
pub type Result<T> = std::result::Result<T, SecurityError>;

/// Errors that can occur while validating or accessing a guarded path.
///
/// The guard exposes two failure styles. Soft operations (`read`, `write`,
/// `exists`, ...) collapse every variant into `None`/`false`. Hard operations
/// (`try_validate`, `secure_read`, `read_dir`, `watch`, ...) return the
/// variant so callers can tell "missing" apart from "malicious" via
/// [`SecurityError::is_security_violation`].
#[derive(Error, Debug)]
pub enum SecurityError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Candidate path is empty or otherwise unusable.
    #[error("invalid path input: {reason}")]
    InvalidInput {
        /// Why the input was rejected.
        reason: String,
    },

    /// Candidate contains a blocked sequence (traversal, metacharacter,
    /// URI scheme, UNC prefix or a caller-supplied pattern).
    #[error("blocked pattern {pattern:?} in path {path:?}")]
    BlockedPattern {
        /// The candidate after control-character stripping.
        path: String,
        /// The offending pattern.
        pattern: String,
    },

    /// Resolved path escapes the trusted base.
    #[error("path traversal detected: {path} (relative to base: {relative})")]
    PathTraversal {
        /// The path that attempted traversal.
        path: PathBuf,
        /// Path of the candidate relative to the base.
        relative: PathBuf,
    },

    /// A symlink (or swapped path) resolves outside the trusted base.
    #[error("symlink target outside trusted base: {path} -> {real}")]
    SymlinkEscape {
        /// The lexical path that was accessed.
        path: PathBuf,
        /// The real path it resolved to.
        real: PathBuf,
    },

    /// File extension is not in the allowlist.
    #[error("file extension not allowed: {path}")]
    DisallowedExtension {
        /// The rejected path.
        path: PathBuf,
    },

    /// Directory is not under one of the allowed subdirectories.
    #[error("path outside allowed subdirectories: {path}")]
    OutsideAllowlist {
        /// The rejected path.
        path: PathBuf,
    },

    /// File exceeds the size ceiling.
    #[error("file too large: {size} bytes exceeds limit of {max} bytes")]
    FileTooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed maximum in bytes.
        max: u64,
    },

    /// Operation not permitted by security policy.
    #[error("operation denied by security policy: {reason}")]
    SecurityViolation {
        /// Reason for the violation.
        reason: String,
    },
}

impl SecurityError {
    /// Returns `true` if this error represents a detected attack pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use locguard_core::SecurityError;
    /// use std::path::PathBuf;
    ///
    /// let err = SecurityError::PathTraversal {
    ///     path: PathBuf::from("/etc/passwd"),
    ///     relative: PathBuf::from("../../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = SecurityError::InvalidInput { reason: "empty".into() };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::BlockedPattern { .. }
                | Self::PathTraversal { .. }
                | Self::SymlinkEscape { .. }
                | Self::DisallowedExtension { .. }
                | Self::OutsideAllowlist { .. }
                | Self::SecurityViolation { .. }
        )
    }

    /// Returns `true` for an ordinary "does not exist" condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Returns `true` for a permission-denied I/O condition.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use locguard_core::SecurityError;
    ///
    /// let err = SecurityError::SecurityViolation { reason: "nope".into() };
    /// assert_eq!(err.context(), Some("nope"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { reason } | Self::SecurityViolation { reason } => Some(reason),
            Self::BlockedPattern { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    /// Short machine-readable name of the variant, used in audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidInput { .. } => "invalid_input",
            Self::BlockedPattern { .. } => "blocked_pattern",
            Self::PathTraversal { .. } => "path_traversal",
            Self::SymlinkEscape { .. } => "symlink_escape",
            Self::DisallowedExtension { .. } => "disallowed_extension",
            Self::OutsideAllowlist { .. } => "outside_allowlist",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::SecurityViolation { .. } => "security_violation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_error() {
        let err = SecurityError::PathTraversal {
            path: PathBuf::from("/etc/passwd"),
            relative: PathBuf::from("../../etc/passwd"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../../etc/passwd"));
        assert_eq!(err.kind(), "path_traversal");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SecurityError = io_err.into();
        assert!(matches!(err, SecurityError::Io(_)));
        assert!(err.is_not_found());
        assert!(!err.is_permission_denied());
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_is_security_violation() {
        let violations = [
            SecurityError::BlockedPattern {
                path: "a;b".into(),
                pattern: ";".into(),
            },
            SecurityError::SymlinkEscape {
                path: PathBuf::from("link"),
                real: PathBuf::from("/etc/passwd"),
            },
            SecurityError::DisallowedExtension {
                path: PathBuf::from("a.js"),
            },
            SecurityError::OutsideAllowlist {
                path: PathBuf::from("secret"),
            },
            SecurityError::SecurityViolation {
                reason: "test".into(),
            },
        ];
        for err in &violations {
            assert!(err.is_security_violation(), "{err}");
        }

        let benign = [
            SecurityError::InvalidInput {
                reason: "empty".into(),
            },
            SecurityError::FileTooLarge { size: 11, max: 10 },
            SecurityError::Io(std::io::Error::other("boom")),
        ];
        for err in &benign {
            assert!(!err.is_security_violation(), "{err}");
        }
    }

    #[test]
    fn test_context() {
        let err = SecurityError::BlockedPattern {
            path: "x$y".into(),
            pattern: "$".into(),
        };
        assert_eq!(err.context(), Some("$"));

        let err = SecurityError::FileTooLarge { size: 2, max: 1 };
        assert_eq!(err.context(), None);
    }

    #[test]
    fn test_blocked_pattern_display_escapes_input() {
        let err = SecurityError::BlockedPattern {
            path: "a\nb".into(),
            pattern: "`".into(),
        };
        assert!(err.to_string().contains("\\n"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = SecurityError::FileTooLarge {
            size: 20_000_000,
            max: 10_485_760,
        };
        let display = err.to_string();
        assert!(display.contains("20000000"));
        assert!(display.contains("10485760"));
    }
}
