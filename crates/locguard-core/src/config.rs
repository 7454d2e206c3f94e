//! Options controlling path validation and guarded operations.

use regex::Regex;

/// Maximum size of a file read or written through the guard (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validation options with default-deny settings.
///
/// # Examples
///
/// ```
/// use locguard_core::SanitizeOptions;
///
/// // Secure defaults
/// let options = SanitizeOptions::default();
/// assert!(!options.allow_absolute);
///
/// // Only locale files
/// let json_only = SanitizeOptions {
///     allowed_extensions: vec![".json".to_string()],
///     ..Default::default()
/// };
/// assert!(json_only.is_extension_allowed("JSON"));
/// ```
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Skip the lexical `..` checks. Containment in the base still applies.
    pub allow_traversal: bool,

    /// Create the parent directory of the resolved path when missing.
    pub create_if_not_exists: bool,

    /// Normalize separators (`\` to `/`, duplicates collapsed, trailing
    /// separators stripped) before resolving.
    pub normalize: bool,

    /// Also accept absolute candidates spelled against the canonical base
    /// (for example `/private/var/...` when the base is `/var/...`). Paths
    /// outside the base are rejected regardless.
    pub allow_absolute: bool,

    /// Allowed file extensions, with or without leading dot (empty = allow
    /// all).
    pub allowed_extensions: Vec<String>,

    /// Additional patterns that reject a candidate when they match.
    pub custom_patterns: Vec<Regex>,
}

impl Default for SanitizeOptions {
    /// Default values:
    /// - `allow_traversal`: false
    /// - `create_if_not_exists`: false
    /// - `normalize`: true
    /// - `allow_absolute`: false
    /// - `allowed_extensions`: empty (allow all)
    /// - `custom_patterns`: empty
    fn default() -> Self {
        Self {
            allow_traversal: false,
            create_if_not_exists: false,
            normalize: true,
            allow_absolute: false,
            allowed_extensions: Vec::new(),
            custom_patterns: Vec::new(),
        }
    }
}

impl SanitizeOptions {
    /// Restricts accepted files to the given extensions.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a custom rejection pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.custom_patterns.push(pattern);
        self
    }

    /// Validates whether a file extension is allowed.
    ///
    /// Comparison is case-insensitive and ignores a leading dot on either
    /// side, so `.JSON`, `json` and `.json` all match an entry of `".json"`.
    #[must_use]
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        let extension = extension.trim_start_matches('.');
        self.allowed_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

/// Options for guarded writes.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Validation options for the target path.
    pub sanitize: SanitizeOptions,

    /// Create missing parent directories.
    pub create_parents: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sanitize: SanitizeOptions::default(),
            create_parents: true,
        }
    }
}

/// Options for guarded directory listings.
#[derive(Debug, Clone, Default)]
pub struct ReaddirOptions {
    /// Validation options for the directory path.
    pub sanitize: SanitizeOptions,

    /// Permitted top-level subdirectories of the base (empty = any).
    ///
    /// The listed directory must live under one of them, and listing the base
    /// itself hides directories outside the list.
    pub allowed_subdirs: Vec<String>,

    /// Dereference each symlinked entry and drop those escaping the base.
    pub verify_entries: bool,

    /// Walk the whole subtree instead of the direct children.
    pub recursive: bool,
}

impl ReaddirOptions {
    /// Returns `true` if `name` is a permitted subdirectory.
    #[must_use]
    pub fn is_subdir_allowed(&self, name: &str) -> bool {
        self.allowed_subdirs.is_empty() || self.allowed_subdirs.iter().any(|dir| dir == name)
    }
}

/// Options for guarded directory creation.
#[derive(Debug, Clone)]
pub struct MkdirOptions {
    /// Validation options for the directory path.
    pub sanitize: SanitizeOptions,

    /// Create missing ancestors as well (`mkdir -p`).
    pub recursive: bool,
}

impl Default for MkdirOptions {
    fn default() -> Self {
        Self {
            sanitize: SanitizeOptions::default(),
            recursive: true,
        }
    }
}

/// Options for free-text input sanitizing.
#[derive(Debug, Clone, Copy)]
pub struct InputOptions {
    /// Truncate the result to this many characters.
    pub max_length: Option<usize>,

    /// Remove any remaining HTML-like tag after script patterns are gone.
    pub strip_tags: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            max_length: None,
            strip_tags: true,
        }
    }
}
