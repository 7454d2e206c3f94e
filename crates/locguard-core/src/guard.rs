//! The guarded file-system facade.

use std::fs::Metadata;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::MAX_FILE_SIZE;
use crate::MkdirOptions;
use crate::ReaddirOptions;
use crate::Result;
use crate::SanitizeOptions;
use crate::SecurityError;
use crate::WriteOptions;
use crate::audit::EventLevel;
use crate::audit::SecurityLogger;
use crate::audit::default_logger;
use crate::fs::GuardedWatcher;
use crate::fs::VerifiedFile;
use crate::fs::list_directory;
use crate::fs::watch_directory;
use crate::fs::write_atomic;
use crate::security;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// Validated, symlink-safe access to the files under one trusted base.
///
/// `PathGuard` is cheap to clone: it holds the base and a shared logger
/// handle and nothing else.
///
/// # Soft and hard operations
///
/// - *Soft* methods (`validate`, `read_to_string`, `write`, `exists`, ...)
///   return `Option`/`bool`. Missing files and permission problems are
///   silent; every rejected candidate is logged at `warn`.
/// - *Hard* methods (`try_validate`, `open_verified`, `secure_read`,
///   `secure_stat`, `read_dir`, `watch` and the other `try_*` methods)
///   return [`SecurityError`], so callers can tell "missing" from
///   "malicious" with [`SecurityError::is_security_violation`]. They log
///   the same events before returning.
///
/// # Examples
///
/// ```no_run
/// use locguard_core::PathGuard;
/// use locguard_core::SanitizeOptions;
/// use locguard_core::WriteOptions;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = PathGuard::new("/srv/app")?;
///
/// assert!(guard.write("locales/en.json", "{}", &WriteOptions::default()));
/// let content = guard.read_to_string("locales/en.json", &SanitizeOptions::default());
/// assert_eq!(content.as_deref(), Some("{}"));
///
/// assert!(guard.validate("../../etc/passwd").is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PathGuard {
    base: TrustedBase,
    logger: Arc<SecurityLogger>,
}

impl PathGuard {
    /// Creates a guard for `base` using the process default logger.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an existing directory.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::from_base(TrustedBase::new(base)?))
    }

    /// Creates a guard for the process working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory is unavailable.
    pub fn current_dir() -> Result<Self> {
        Ok(Self::from_base(TrustedBase::current_dir()?))
    }

    /// Creates a guard for an already validated base.
    #[must_use]
    pub fn from_base(base: TrustedBase) -> Self {
        Self {
            base,
            logger: default_logger(),
        }
    }

    /// Replaces the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<SecurityLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Returns the trusted base.
    #[must_use]
    pub fn base(&self) -> &TrustedBase {
        &self.base
    }

    /// Returns the logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<SecurityLogger> {
        &self.logger
    }

    // Hard operations

    /// Validates `candidate` with `options`.
    ///
    /// # Errors
    ///
    /// See [`security::try_validate`].
    pub fn try_validate(&self, candidate: &str, options: &SanitizeOptions) -> Result<ResolvedPath> {
        security::try_validate(candidate, &self.base, options)
            .inspect_err(|e| self.report("validate", candidate, e))
    }

    /// Validates `candidate` and opens it read-only through a verified
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Validation errors, `SymlinkEscape` if the descriptor resolves outside
    /// the base, or `Io` if the open fails.
    pub fn open_verified(&self, candidate: &str, options: &SanitizeOptions) -> Result<VerifiedFile> {
        self.run("open", candidate, || {
            let resolved = security::try_validate(candidate, &self.base, options)?;
            VerifiedFile::open(&resolved, &self.base)
        })
    }

    /// Reads a UTF-8 file of at most [`MAX_FILE_SIZE`] bytes through a
    /// verified descriptor.
    ///
    /// # Errors
    ///
    /// Validation errors, `FileTooLarge`, `InvalidInput` for non-regular
    /// files, or `Io`.
    pub fn secure_read(&self, candidate: &str, options: &SanitizeOptions) -> Result<String> {
        self.run("read", candidate, || {
            let resolved = security::try_validate(candidate, &self.base, options)?;
            VerifiedFile::open(&resolved, &self.base)?.read_to_string_limited(MAX_FILE_SIZE)
        })
    }

    /// Reads raw bytes with the same checks as [`secure_read`](Self::secure_read).
    ///
    /// # Errors
    ///
    /// As [`secure_read`](Self::secure_read), without the UTF-8 check.
    pub fn try_read_bytes(&self, candidate: &str, options: &SanitizeOptions) -> Result<Vec<u8>> {
        self.run("read", candidate, || {
            let resolved = security::try_validate(candidate, &self.base, options)?;
            VerifiedFile::open(&resolved, &self.base)?.read_limited(MAX_FILE_SIZE)
        })
    }

    /// Atomically writes `data` to `candidate`.
    ///
    /// # Errors
    ///
    /// See [`write_atomic`].
    pub fn try_write(&self, candidate: &str, data: &[u8], options: &WriteOptions) -> Result<()> {
        self.run("write", candidate, || {
            let resolved = security::try_validate(candidate, &self.base, &options.sanitize)?;
            write_atomic(&resolved, &self.base, data, options.create_parents)
        })
    }

    /// Returns descriptor metadata for `candidate`.
    ///
    /// # Errors
    ///
    /// Validation errors, `SymlinkEscape`, or `Io` if it cannot be opened.
    pub fn secure_stat(&self, candidate: &str) -> Result<Metadata> {
        self.run("stat", candidate, || {
            let resolved =
                security::try_validate(candidate, &self.base, &SanitizeOptions::default())?;
            Ok(VerifiedFile::open(&resolved, &self.base)?.metadata().clone())
        })
    }

    /// Returns whether `candidate` exists after validation.
    ///
    /// # Errors
    ///
    /// Validation errors or `Io` if existence cannot be determined.
    pub fn try_exists(&self, candidate: &str) -> Result<bool> {
        self.run("exists", candidate, || {
            let resolved =
                security::try_validate(candidate, &self.base, &SanitizeOptions::default())?;
            Ok(resolved.as_path().try_exists()?)
        })
    }

    /// Creates the directory `candidate` and returns its validated path.
    /// An existing directory is not an error.
    ///
    /// # Errors
    ///
    /// Validation errors, `SymlinkEscape` if the created directory resolves
    /// outside the base, or `Io`.
    pub fn try_create_dir(&self, candidate: &str, options: &MkdirOptions) -> Result<ResolvedPath> {
        self.run("mkdir", candidate, || {
            let resolved = security::try_validate(candidate, &self.base, &options.sanitize)?;
            let path = resolved.as_path();
            if !path.is_dir() {
                if options.recursive {
                    std::fs::create_dir_all(path)?;
                } else {
                    std::fs::create_dir(path)?;
                }
            }
            security::verify_physical(path, &self.base)?;
            Ok(resolved)
        })
    }

    /// Removes `candidate`: files and symlinks are unlinked, directories are
    /// removed recursively. A symlink is never followed, even when its
    /// target lies outside the base.
    ///
    /// # Errors
    ///
    /// Validation errors, `SecurityViolation` for the base itself,
    /// `SymlinkEscape` if the parent or a directory resolves outside the
    /// base, or `Io` (including not-found).
    pub fn try_remove(&self, candidate: &str) -> Result<()> {
        self.run("delete", candidate, || {
            let resolved =
                security::validate_lexically(candidate, &self.base, &SanitizeOptions::default())?;
            if resolved.is_base() {
                return Err(SecurityError::SecurityViolation {
                    reason: "refusing to delete the trusted base".to_string(),
                });
            }
            let path = resolved.as_path();
            if let Some(parent) = path.parent() {
                security::verify_physical(parent, &self.base)?;
            }

            let metadata = std::fs::symlink_metadata(path)?;
            if metadata.is_symlink() || metadata.is_file() {
                std::fs::remove_file(path)?;
            } else if metadata.is_dir() {
                let real = path.canonicalize()?;
                if !self.base.contains_real(&real) {
                    return Err(SecurityError::SymlinkEscape {
                        path: path.to_path_buf(),
                        real,
                    });
                }
                std::fs::remove_dir_all(path)?;
            } else {
                std::fs::remove_file(path)?;
            }
            Ok(())
        })
    }

    /// Lists a directory; see [`list_directory`]. Symlinked entries dropped
    /// by `verify_entries` are logged.
    ///
    /// # Errors
    ///
    /// Validation errors, `OutsideAllowlist`, `SymlinkEscape`,
    /// `InvalidInput` when `candidate` is not a directory, or `Io`.
    pub fn read_dir(&self, candidate: &str, options: &ReaddirOptions) -> Result<Vec<String>> {
        let listing = self.run("readdir", candidate, || {
            let resolved = security::try_validate(candidate, &self.base, &options.sanitize)?;
            list_directory(&resolved, &self.base, options)
        })?;

        for name in &listing.escaped {
            self.logger.log(
                "symlinked entry outside trusted base removed from listing",
                EventLevel::Warn,
                json!({
                    "operation": "readdir",
                    "candidate": candidate,
                    "entry": name,
                    "base": self.base.as_path().display().to_string(),
                }),
            );
        }
        Ok(listing.entries)
    }

    /// Watches the directory `candidate` recursively.
    ///
    /// # Errors
    ///
    /// See [`watch_directory`].
    pub fn watch<F>(&self, candidate: &str, handler: F) -> Result<GuardedWatcher>
    where
        F: Fn(notify::Event) + Send + 'static,
    {
        self.run("watch", candidate, || {
            let resolved =
                security::try_validate(candidate, &self.base, &SanitizeOptions::default())?;
            watch_directory(&resolved, &self.base, Arc::clone(&self.logger), handler)
        })
    }

    // Soft operations

    /// Validates `candidate` with default options.
    pub fn validate(&self, candidate: &str) -> Option<ResolvedPath> {
        self.sanitize(candidate, &SanitizeOptions::default())
    }

    /// Validates `candidate` with `options`.
    pub fn sanitize(&self, candidate: &str, options: &SanitizeOptions) -> Option<ResolvedPath> {
        self.try_validate(candidate, options).ok()
    }

    /// Reads a UTF-8 file, or `None`.
    pub fn read_to_string(&self, candidate: &str, options: &SanitizeOptions) -> Option<String> {
        self.secure_read(candidate, options).ok()
    }

    /// Reads raw bytes, or `None`.
    pub fn read(&self, candidate: &str, options: &SanitizeOptions) -> Option<Vec<u8>> {
        self.try_read_bytes(candidate, options).ok()
    }

    /// Atomically writes `data`; returns whether it succeeded.
    pub fn write(&self, candidate: &str, data: impl AsRef<[u8]>, options: &WriteOptions) -> bool {
        self.try_write(candidate, data.as_ref(), options).is_ok()
    }

    /// Returns whether `candidate` is valid and exists.
    pub fn exists(&self, candidate: &str) -> bool {
        self.try_exists(candidate).unwrap_or(false)
    }

    /// Returns metadata, or `None`.
    pub fn metadata(&self, candidate: &str) -> Option<Metadata> {
        self.secure_stat(candidate).ok()
    }

    /// Creates a directory and returns its path, or `None`.
    pub fn create_dir(&self, candidate: &str, options: &MkdirOptions) -> Option<ResolvedPath> {
        self.try_create_dir(candidate, options).ok()
    }

    /// Removes a file, symlink or directory; returns whether it succeeded.
    pub fn remove(&self, candidate: &str) -> bool {
        self.try_remove(candidate).is_ok()
    }

    fn run<T>(&self, operation: &str, candidate: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        f().inspect_err(|e| self.report(operation, candidate, e))
    }

    /// Logs a failure at the level its kind calls for.
    ///
    /// Violations and oversized files go out at `warn`, malformed input and
    /// permission problems at `debug`, other I/O failures at `error`.
    /// Not-found is silent.
    fn report(&self, operation: &str, candidate: &str, error: &SecurityError) {
        let level = match error {
            e if e.is_security_violation() => EventLevel::Warn,
            SecurityError::FileTooLarge { .. } => EventLevel::Warn,
            SecurityError::InvalidInput { .. } => EventLevel::Debug,
            SecurityError::Io(io) => match io.kind() {
                io::ErrorKind::NotFound => return,
                io::ErrorKind::PermissionDenied => EventLevel::Debug,
                _ => EventLevel::Error,
            },
            _ => EventLevel::Error,
        };

        let mut context = Map::new();
        context.insert("operation".into(), json!(operation));
        context.insert("candidate".into(), json!(candidate));
        context.insert(
            "base".into(),
            json!(self.base.as_path().display().to_string()),
        );
        context.insert("kind".into(), json!(error.kind()));
        context.insert("error".into(), json!(error.to_string()));
        match error {
            SecurityError::PathTraversal { path, relative } => {
                context.insert("resolved".into(), json!(path.display().to_string()));
                context.insert("relative".into(), json!(relative.display().to_string()));
            }
            SecurityError::SymlinkEscape { path, real } => {
                context.insert("resolved".into(), json!(path.display().to_string()));
                context.insert("real".into(), json!(real.display().to_string()));
            }
            SecurityError::BlockedPattern { pattern, .. } => {
                context.insert("pattern".into(), json!(pattern));
            }
            _ => {}
        }

        let message = if error.is_security_violation() {
            "security violation: path rejected"
        } else {
            "guarded file operation failed"
        };
        self.logger.log(message, level, Value::Object(context));
    }
}
