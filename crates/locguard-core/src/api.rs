//! Free-function API over [`PathGuard`].
//!
//! Each function takes an optional base directory (the working directory
//! when `None`), builds a guard with the process default logger and runs a
//! single operation. Synchronous functions take the plain name; the `_async`
//! variants run the same work on tokio's blocking pool.
//!
//! # Examples
//!
//! ```no_run
//! use locguard_core::SanitizeOptions;
//! use locguard_core::WriteOptions;
//! use locguard_core::api;
//! use std::path::Path;
//!
//! let base = Some(Path::new("/tmp/proj"));
//! assert!(api::safe_write_file("a/b.json", "{}", base, &WriteOptions::default()));
//! assert!(api::safe_read_file("a/b.json", base, &SanitizeOptions::default()).is_some());
//! assert!(api::validate_path("../../etc/passwd", base).is_none());
//! ```

use std::fs::Metadata;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;

use crate::InputOptions;
use crate::MkdirOptions;
use crate::PathGuard;
use crate::ReaddirOptions;
use crate::Result;
use crate::SanitizeOptions;
use crate::SecurityError;
use crate::WriteOptions;
use crate::audit::EventLevel;
use crate::audit::default_logger;
use crate::security;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// Validates `candidate` with default options.
pub fn validate_path(candidate: &str, base: Option<&Path>) -> Option<ResolvedPath> {
    sanitize_path(candidate, base, &SanitizeOptions::default())
}

/// Validates `candidate` with `options`.
pub fn sanitize_path(
    candidate: &str,
    base: Option<&Path>,
    options: &SanitizeOptions,
) -> Option<ResolvedPath> {
    guard_for(base)?.sanitize(candidate, options)
}

/// Reads a UTF-8 file of at most 10 MiB, or `None`.
pub fn safe_read_file(
    candidate: &str,
    base: Option<&Path>,
    options: &SanitizeOptions,
) -> Option<String> {
    guard_for(base)?.read_to_string(candidate, options)
}

/// Atomically writes `data`; returns whether it succeeded.
pub fn safe_write_file(
    candidate: &str,
    data: impl AsRef<[u8]>,
    base: Option<&Path>,
    options: &WriteOptions,
) -> bool {
    guard_for(base).is_some_and(|guard| guard.write(candidate, data, options))
}

/// Returns whether `candidate` is valid and exists.
pub fn safe_exists(candidate: &str, base: Option<&Path>) -> bool {
    guard_for(base).is_some_and(|guard| guard.exists(candidate))
}

/// Returns descriptor metadata, or `None`.
pub fn safe_stat(candidate: &str, base: Option<&Path>) -> Option<Metadata> {
    guard_for(base)?.metadata(candidate)
}

/// Lists a directory.
///
/// # Errors
///
/// Returns the security error for rejected candidates, an invalid base, or
/// I/O failures. A missing directory yields an empty list.
pub fn safe_readdir(
    candidate: &str,
    base: Option<&Path>,
    options: &ReaddirOptions,
) -> Result<Vec<String>> {
    let guard = PathGuard::from_base(TrustedBase::from_option(base)?);
    guard.read_dir(candidate, options)
}

/// Creates a directory and returns its validated path, or `None`.
pub fn safe_mkdir(
    candidate: &str,
    base: Option<&Path>,
    options: &MkdirOptions,
) -> Option<ResolvedPath> {
    guard_for(base)?.create_dir(candidate, options)
}

/// Removes a file, symlink or directory; returns whether it succeeded.
pub fn safe_delete(candidate: &str, base: Option<&Path>) -> bool {
    guard_for(base).is_some_and(|guard| guard.remove(candidate))
}

/// Removes script-injection constructs from free text.
#[must_use]
pub fn sanitize_input(text: &str, options: &InputOptions) -> String {
    security::sanitize_input(text, options)
}

/// Records a security event through the default logger.
///
/// `level` is parsed leniently (unknown names become `info`).
pub fn log_security_event(message: &str, level: &str, context: Value) {
    default_logger().log_with_level_name(message, level, context);
}

/// Async [`safe_read_file`].
pub async fn safe_read_file_async(
    candidate: impl Into<String>,
    base: Option<PathBuf>,
    options: SanitizeOptions,
) -> Option<String> {
    let candidate = candidate.into();
    blocking("read", move || {
        safe_read_file(&candidate, base.as_deref(), &options)
    })
    .await
}

/// Async [`safe_write_file`].
pub async fn safe_write_file_async(
    candidate: impl Into<String>,
    data: impl Into<Vec<u8>>,
    base: Option<PathBuf>,
    options: WriteOptions,
) -> bool {
    let candidate = candidate.into();
    let data = data.into();
    blocking("write", move || {
        safe_write_file(&candidate, data, base.as_deref(), &options)
    })
    .await
}

/// Async [`safe_exists`].
pub async fn safe_exists_async(candidate: impl Into<String>, base: Option<PathBuf>) -> bool {
    let candidate = candidate.into();
    blocking("exists", move || safe_exists(&candidate, base.as_deref())).await
}

/// Async [`safe_stat`].
pub async fn safe_stat_async(
    candidate: impl Into<String>,
    base: Option<PathBuf>,
) -> Option<Metadata> {
    let candidate = candidate.into();
    blocking("stat", move || safe_stat(&candidate, base.as_deref())).await
}

/// Async [`safe_readdir`].
///
/// # Errors
///
/// As [`safe_readdir`], plus `SecurityError::Io` if the blocking task
/// fails to join.
pub async fn safe_readdir_async(
    candidate: impl Into<String>,
    base: Option<PathBuf>,
    options: ReaddirOptions,
) -> Result<Vec<String>> {
    let candidate = candidate.into();
    tokio::task::spawn_blocking(move || safe_readdir(&candidate, base.as_deref(), &options))
        .await
        .map_err(|e| {
            join_failed("readdir", &e);
            SecurityError::Io(std::io::Error::other(e))
        })?
}

/// Async [`safe_mkdir`].
pub async fn safe_mkdir_async(
    candidate: impl Into<String>,
    base: Option<PathBuf>,
    options: MkdirOptions,
) -> Option<ResolvedPath> {
    let candidate = candidate.into();
    blocking("mkdir", move || {
        safe_mkdir(&candidate, base.as_deref(), &options)
    })
    .await
}

/// Async [`safe_delete`].
pub async fn safe_delete_async(candidate: impl Into<String>, base: Option<PathBuf>) -> bool {
    let candidate = candidate.into();
    blocking("delete", move || safe_delete(&candidate, base.as_deref())).await
}

fn guard_for(base: Option<&Path>) -> Option<PathGuard> {
    match TrustedBase::from_option(base) {
        Ok(base) => Some(PathGuard::from_base(base)),
        Err(e) => {
            default_logger().log(
                "trusted base unavailable",
                EventLevel::Error,
                json!({
                    "base": base.map(|b| b.display().to_string()),
                    "error": e.to_string(),
                }),
            );
            None
        }
    }
}

async fn blocking<T, F>(operation: &'static str, f: F) -> T
where
    T: Default + Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) => {
            join_failed(operation, &e);
            T::default()
        }
    }
}

fn join_failed(operation: &str, error: &tokio::task::JoinError) {
    default_logger().log(
        "blocking file operation did not complete",
        EventLevel::Error,
        json!({ "operation": operation, "error": error.to_string() }),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_path_joins_base() {
        let temp = TempDir::new().unwrap();
        let base = TrustedBase::new(temp.path()).unwrap();
        let resolved = validate_path("file.txt", Some(temp.path())).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("file.txt"));
    }

    #[test]
    fn test_invalid_base_is_soft_failure() {
        let missing = Path::new("/nonexistent/locguard/base");
        assert!(validate_path("a.txt", Some(missing)).is_none());
        assert!(!safe_exists("a.txt", Some(missing)));
        assert!(safe_readdir(".", Some(missing), &ReaddirOptions::default()).is_err());
    }

    #[test]
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    fn test_free_function_round_trip() {
        let temp = TempDir::new().unwrap();
        let base = Some(temp.path());

        assert!(safe_write_file("a/b.json", "{}", base, &WriteOptions::default()));
        assert_eq!(
            safe_read_file("a/b.json", base, &SanitizeOptions::default()).as_deref(),
            Some("{}")
        );
        assert!(safe_exists("a/b.json", base));
        assert_eq!(safe_stat("a/b.json", base).map(|m| m.len()), Some(2));
        assert_eq!(
            safe_readdir("a", base, &ReaddirOptions::default()).unwrap(),
            vec!["b.json"]
        );
        assert!(safe_mkdir("c/d", base, &MkdirOptions::default()).is_some());
        assert!(safe_delete("a", base));
        assert!(!fs::exists(temp.path().join("a")).unwrap());
    }

    #[test]
    fn test_sanitize_input_delegates() {
        assert_eq!(
            sanitize_input("<b>hi</b><script>x</script>", &InputOptions::default()),
            "hi"
        );
    }

    #[test]
    fn test_log_security_event_never_fails() {
        log_security_event("custom event", "nonsense-level", json!({ "pin": 1234 }));
        log_security_event("plain", "error", Value::Null);
    }

    #[tokio::test]
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    async fn test_async_free_functions() {
        let temp = TempDir::new().unwrap();
        let base = Some(temp.path().to_path_buf());

        assert!(
            safe_write_file_async("x.json", "[]", base.clone(), WriteOptions::default()).await
        );
        assert_eq!(
            safe_read_file_async("x.json", base.clone(), SanitizeOptions::default())
                .await
                .as_deref(),
            Some("[]")
        );
        assert!(safe_exists_async("x.json", base.clone()).await);
        assert!(safe_stat_async("x.json", base.clone()).await.is_some());
        assert_eq!(
            safe_readdir_async(".", base.clone(), ReaddirOptions::default())
                .await
                .unwrap(),
            vec!["x.json"]
        );
        assert!(
            safe_mkdir_async("d", base.clone(), MkdirOptions::default())
                .await
                .is_some()
        );
        assert!(safe_delete_async("x.json", base.clone()).await);
        assert!(!safe_exists_async("x.json", base).await);
    }
}
