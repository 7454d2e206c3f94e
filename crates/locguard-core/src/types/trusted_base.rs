//! Validated trusted base directory type.

use crate::Result;
use crate::SecurityError;
use crate::security::path::normalize_lexically;
use std::path::Path;
use std::path::PathBuf;

/// The directory root every guarded path must stay within.
///
/// A `TrustedBase` keeps two forms of the same directory:
/// - the *lexical* form: absolute and normalized, but with symlinks left in
///   place. Resolved paths are built from it, so `file.txt` validates to
///   exactly `<base>/file.txt`.
/// - the *canonical* form: fully symlink-resolved. Physical checks (real
///   paths obtained from descriptors or `canonicalize`) are compared against
///   it.
///
/// # Examples
///
/// ```no_run
/// use locguard_core::types::TrustedBase;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let base = TrustedBase::new("/srv/app")?;
/// println!("Guarding: {}", base.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedBase {
    lexical: PathBuf,
    canonical: PathBuf,
}

impl TrustedBase {
    /// Creates a new `TrustedBase` after validating the path.
    ///
    /// # Validation
    ///
    /// 1. Makes the path absolute against the working directory
    /// 2. Normalizes `.` and `..` components lexically
    /// 3. Verifies the path exists and is a directory
    /// 4. Canonicalizes it for physical containment checks
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(SecurityError::InvalidInput {
                reason: "trusted base path is empty".to_string(),
            });
        }

        let lexical = normalize_lexically(&std::path::absolute(&path)?);

        let metadata = std::fs::metadata(&lexical).map_err(|e| {
            SecurityError::Io(std::io::Error::new(
                e.kind(),
                format!("trusted base {} is not accessible: {e}", lexical.display()),
            ))
        })?;
        if !metadata.is_dir() {
            return Err(SecurityError::InvalidInput {
                reason: format!("trusted base is not a directory: {}", lexical.display()),
            });
        }

        let canonical = lexical.canonicalize().map_err(|e| {
            SecurityError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize base {}: {e}", lexical.display()),
            ))
        })?;

        Ok(Self { lexical, canonical })
    }

    /// Uses the process working directory as the base.
    pub fn current_dir() -> Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    /// Uses `base` when given, otherwise the working directory.
    pub fn from_option(base: Option<&Path>) -> Result<Self> {
        base.map_or_else(Self::current_dir, Self::new)
    }

    /// Returns the lexical absolute path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.lexical
    }

    /// Returns the canonical (symlink-free) path.
    #[inline]
    #[must_use]
    pub fn canonical(&self) -> &Path {
        &self.canonical
    }

    /// Returns `true` if a real (symlink-resolved) path is inside the base.
    #[inline]
    #[must_use]
    pub fn contains_real(&self, real: &Path) -> bool {
        real.starts_with(&self.canonical)
    }

    /// Returns `true` if an absolute normalized path is lexically inside the
    /// base.
    #[inline]
    #[must_use]
    pub fn contains_lexical(&self, path: &Path) -> bool {
        path.starts_with(&self.lexical)
    }

    /// Converts into the lexical `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.lexical
    }
}

impl AsRef<Path> for TrustedBase {
    fn as_ref(&self) -> &Path {
        &self.lexical
    }
}
