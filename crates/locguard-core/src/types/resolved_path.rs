//! Validated resolved path type.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

/// An absolute, normalized path that passed validation against a
/// [`TrustedBase`](super::TrustedBase).
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation
/// - Absolute and free of `.`/`..` components
///
/// # Examples
///
/// ```no_run
/// use locguard_core::SanitizeOptions;
/// use locguard_core::security::try_validate;
/// use locguard_core::types::TrustedBase;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let base = TrustedBase::new("/srv/app")?;
/// let resolved = try_validate("locales/en.json", &base, &SanitizeOptions::default())?;
/// assert_eq!(resolved.as_path(), base.as_path().join("locales/en.json"));
/// assert!(try_validate("../etc/passwd", &base, &SanitizeOptions::default()).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    path: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    /// Creates a `ResolvedPath` from an already validated path.
    pub(crate) fn new_unchecked(path: PathBuf, relative: PathBuf) -> Self {
        Self { path, relative }
    }

    /// Returns the absolute path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Returns the path relative to the base. Empty for the base itself, and
    /// equal to the absolute path for accepted out-of-base absolute input.
    #[inline]
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Returns `true` if this path is the base directory itself.
    #[inline]
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
