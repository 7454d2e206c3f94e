//! Error conversion utilities for CLI.
//!
//! Converts locguard-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use locguard_core::SecurityError;
use std::io;

/// Converts `SecurityError` to user-friendly anyhow error with context
pub fn convert_security_error(err: SecurityError, candidate: &str) -> anyhow::Error {
    match err {
        SecurityError::PathTraversal { path, .. } => anyhow!(
            "Security violation: '{candidate}' resolves outside the project root ({})\n\
             HINT: Pass a path relative to --base without '..' segments.",
            path.display()
        ),
        SecurityError::BlockedPattern { pattern, .. } => anyhow!(
            "Security violation: '{candidate}' contains a blocked pattern ({pattern})\n\
             HINT: Paths may not contain traversal, shell metacharacters or URL schemes."
        ),
        SecurityError::SymlinkEscape { real, .. } => anyhow!(
            "Security violation: '{candidate}' follows a symlink out of the project root to '{}'\n\
             HINT: Remove the link or point it at a target inside --base.",
            real.display()
        ),
        SecurityError::DisallowedExtension { .. } => anyhow!(
            "Rejected '{candidate}': file extension is not allowed\n\
             HINT: Use --ext to widen the extension allowlist."
        ),
        SecurityError::OutsideAllowlist { .. } => anyhow!(
            "Rejected '{candidate}': directory is not in the listing allowlist\n\
             HINT: Use --allow-subdir to permit additional top-level directories."
        ),
        SecurityError::FileTooLarge { size, max } => anyhow!(
            "Rejected '{candidate}': {size} bytes exceeds the {max} byte limit"
        ),
        SecurityError::InvalidInput { reason } => {
            anyhow!("Invalid path '{candidate}': {reason}")
        }
        SecurityError::SecurityViolation { reason } => {
            anyhow!("Security violation on '{candidate}': {reason}")
        }
        SecurityError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
            anyhow!("No such file or directory: '{candidate}'")
        }
        SecurityError::Io(io_err) if io_err.kind() == io::ErrorKind::PermissionDenied => anyhow!(
            "Permission denied: '{candidate}'\n\
             HINT: Check the file permissions inside the project root."
        ),
        SecurityError::Io(io_err) => {
            anyhow!("I/O error while processing '{candidate}': {io_err}")
        }
    }
}

/// Adds path context to a guard result
pub fn add_path_context<T>(
    result: Result<T, SecurityError>,
    candidate: &str,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_security_error(e, candidate))
}
