//! Path validation against a trusted base.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::SanitizeOptions;
use crate::SecurityError;
use crate::security::patterns::clean_candidate;
use crate::security::patterns::find_blocked_pattern;
use crate::security::patterns::has_drive_prefix;
use crate::security::symlink::verify_physical;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// Validates an untrusted candidate path against `base`.
///
/// This function is pure with respect to logging: it reports *why* a
/// candidate was rejected through the error variant and leaves auditing to
/// the caller ([`PathGuard`](crate::PathGuard) logs every rejection).
///
/// # Validation Steps
///
/// 1. Reject empty input
/// 2. Strip control/format characters and collapse whitespace
/// 3. Reject blocked patterns (`..`, shell metacharacters, URI schemes, UNC
///    prefixes, custom patterns) before any normalization
/// 4. Normalize separators
/// 5. Resolve against the lexical base
/// 6. Reject anything whose path relative to the base climbs out of it or
///    is absolute. No option relaxes this step.
/// 7. Enforce the extension allowlist
/// 8. With `allow_absolute`, absolute input spelled against the canonical
///    base (`/private/var/...` for a `/var/...` base) is rebased onto the
///    lexical base before step 6
/// 9. Verify the deepest existing ancestor is physically inside the base,
///    then optionally create the parent directory
///
/// # Errors
///
/// - `SecurityError::InvalidInput` for empty input
/// - `SecurityError::BlockedPattern` for step 3
/// - `SecurityError::PathTraversal` for step 6
/// - `SecurityError::DisallowedExtension` for step 7
/// - `SecurityError::SymlinkEscape` for step 9
/// - `SecurityError::Io` when the file system cannot be inspected
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
/// let options = SanitizeOptions::default();
///
/// let resolved = try_validate("ui-locales/de.json", &base, &options)?;
/// assert!(resolved.as_path().starts_with(base.as_path()));
///
/// assert!(try_validate("..\\secret.txt", &base, &options).is_err());
/// # Ok(())
/// # }
/// ```
pub fn try_validate(
    candidate: &str,
    base: &TrustedBase,
    options: &SanitizeOptions,
) -> Result<ResolvedPath> {
    let resolved = validate_lexically(candidate, base, options)?;

    // 9. Physical containment, then optional parent creation
    verify_physical(resolved.as_path(), base)?;
    if options.create_if_not_exists
        && let Some(parent) = resolved.as_path().parent()
        && base.contains_lexical(parent)
    {
        std::fs::create_dir_all(parent)?;
        verify_physical(parent, base)?;
    }
    Ok(resolved)
}

/// Runs steps 1 to 8 of [`try_validate`] without touching the file system.
///
/// Callers that must act on a symlink itself (deleting a link whose target
/// escapes) use this and check the parent physically instead.
///
/// # Errors
///
/// As [`try_validate`], except that `SymlinkEscape` is never returned.
pub fn validate_lexically(
    candidate: &str,
    base: &TrustedBase,
    options: &SanitizeOptions,
) -> Result<ResolvedPath> {
    // 1. Empty input
    if candidate.is_empty() {
        return Err(SecurityError::InvalidInput {
            reason: "path is empty".to_string(),
        });
    }

    // 2. Control characters and whitespace
    let cleaned = clean_candidate(candidate);
    if cleaned.is_empty() {
        return Err(SecurityError::InvalidInput {
            reason: "path is empty after removing control characters".to_string(),
        });
    }

    // 3. Blocked patterns, checked on the raw form
    if let Some(pattern) = find_blocked_pattern(&cleaned, !options.allow_traversal) {
        return Err(SecurityError::BlockedPattern {
            path: cleaned,
            pattern,
        });
    }
    if let Some(pattern) = options.custom_patterns.iter().find(|p| p.is_match(&cleaned)) {
        return Err(SecurityError::BlockedPattern {
            pattern: pattern.as_str().to_string(),
            path: cleaned,
        });
    }

    // 4. Separators
    let normalized = if options.normalize {
        normalize_separators(&cleaned)
    } else {
        cleaned
    };
    let candidate_path = Path::new(&normalized);

    // Drive letters are absolute input everywhere; drive-relative forms
    // (`C:foo`) and drive paths on non-Windows hosts cannot be resolved.
    if has_drive_prefix(&normalized) && !candidate_path.is_absolute() {
        return Err(SecurityError::PathTraversal {
            path: candidate_path.to_path_buf(),
            relative: candidate_path.to_path_buf(),
        });
    }
    let is_absolute_input = candidate_path.is_absolute();

    // 5. Resolve
    let mut resolved = normalize_lexically(&base.as_path().join(candidate_path));

    // 8. Canonical spelling of the base
    if is_absolute_input
        && options.allow_absolute
        && !base.contains_lexical(&resolved)
        && let Ok(rest) = resolved.strip_prefix(base.canonical())
    {
        resolved = normalize_lexically(&base.as_path().join(rest));
    }

    // 6. Containment
    if !base.contains_lexical(&resolved) {
        return Err(SecurityError::PathTraversal {
            relative: relative_to(&resolved, base.as_path()),
            path: resolved,
        });
    }

    // 7. Extension allowlist
    if !options.allowed_extensions.is_empty() {
        let extension = resolved
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !options.is_extension_allowed(&extension) {
            return Err(SecurityError::DisallowedExtension { path: resolved });
        }
    }

    let relative = relative_to(&resolved, base.as_path());
    Ok(ResolvedPath::new_unchecked(resolved, relative))
}

/// Converts `\` to `/`, collapses duplicate separators and strips trailing
/// separators (a lone `/` is kept).
///
/// # Examples
///
/// ```
/// use locguard_core::security::path::normalize_separators;
///
/// assert_eq!(normalize_separators("a\\b//c/"), "a/b/c");
/// assert_eq!(normalize_separators("/"), "/");
/// ```
#[must_use]
pub fn normalize_separators(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut previous_was_separator = false;
    for c in candidate.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        out.push(c);
    }
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Resolves `.` and `..` components without touching the file system.
///
/// `..` never climbs above a root; leading `..` of a relative path is kept.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Computes `path` relative to `base`, using `..` where `path` leaves it.
///
/// Both inputs must be absolute and normalized. When they share no root
/// (different Windows drives) `path` is returned unchanged, which is itself
/// absolute and therefore still reads as an escape.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    match (path_components.peek(), base_components.peek()) {
        (Some(a), Some(b)) if a == b => {}
        _ => return path.to_path_buf(),
    }

    while let (Some(a), Some(b)) = (path_components.peek(), base_components.peek()) {
        if a != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut relative = PathBuf::new();
    for _ in base_components {
        relative.push("..");
    }
    for component in path_components {
        relative.push(component);
    }
    relative
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use regex::Regex;
    use tempfile::TempDir;

    fn create_test_base() -> (TempDir, TrustedBase) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let base = TrustedBase::new(temp.path()).expect("failed to create base");
        (temp, base)
    }

    #[test]
    fn test_valid_relative_path() {
        let (_temp, base) = create_test_base();
        let resolved = try_validate("file.txt", &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("file.txt"));
        assert_eq!(resolved.relative(), Path::new("file.txt"));
    }

    #[test]
    fn test_empty_path() {
        let (_temp, base) = create_test_base();
        let result = try_validate("", &base, &SanitizeOptions::default());
        assert!(matches!(result, Err(SecurityError::InvalidInput { .. })));

        let result = try_validate("\0\u{200B}", &base, &SanitizeOptions::default());
        assert!(matches!(result, Err(SecurityError::InvalidInput { .. })));
    }

    #[test]
    fn test_reject_traversal_variants() {
        let (_temp, base) = create_test_base();
        let options = SanitizeOptions::default();
        for candidate in [
            "../secret.txt",
            "..\\secret.txt",
            "a/../../secret.txt",
            "a\\..\\..\\secret.txt",
            "a/..\\../secret.txt",
            "..",
            "a/..",
        ] {
            let result = try_validate(candidate, &base, &options);
            assert!(
                matches!(result, Err(SecurityError::BlockedPattern { .. })),
                "should reject {candidate}: {result:?}"
            );
        }
    }

    #[test]
    fn test_allow_traversal_still_contained() {
        let (_temp, base) = create_test_base();
        let options = SanitizeOptions {
            allow_traversal: true,
            ..Default::default()
        };

        let resolved = try_validate("a/../b.txt", &base, &options).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("b.txt"));

        let result = try_validate("../outside.txt", &base, &options);
        match result {
            Err(SecurityError::PathTraversal { relative, .. }) => {
                assert_eq!(relative, PathBuf::from("../outside.txt"));
            }
            other => panic!("expected traversal, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_inside_base_is_idempotent() {
        let (_temp, base) = create_test_base();
        let inside = base.as_path().join("locales/en.json");
        let candidate = inside.to_str().unwrap();

        let resolved = try_validate(candidate, &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), inside.as_path());

        let again =
            try_validate(resolved.as_path().to_str().unwrap(), &base, &SanitizeOptions::default())
                .unwrap();
        assert_eq!(again, resolved);
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_outside_base() {
        let (_temp, base) = create_test_base();
        let result = try_validate("/etc/passwd", &base, &SanitizeOptions::default());
        assert!(matches!(result, Err(SecurityError::PathTraversal { .. })));

        let options = SanitizeOptions {
            allow_absolute: true,
            ..Default::default()
        };
        let result = try_validate("/etc/passwd", &base, &options);
        assert!(matches!(result, Err(SecurityError::PathTraversal { .. })));
    }

    #[test]
    fn test_allow_absolute_rebases_canonical_spelling() {
        let (temp, base) = create_test_base();
        let canonical = temp.path().canonicalize().unwrap().join("locales/en.json");
        let options = SanitizeOptions {
            allow_absolute: true,
            ..Default::default()
        };

        let resolved = try_validate(canonical.to_str().unwrap(), &base, &options).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("locales/en.json"));
        assert_eq!(resolved.relative(), Path::new("locales/en.json"));
    }

    #[test]
    fn test_drive_prefix_rejected() {
        let (_temp, base) = create_test_base();
        for candidate in ["C:\\Windows\\System32", "c:/windows", "D:relative"] {
            let result = try_validate(candidate, &base, &SanitizeOptions::default());
            assert!(result.is_err(), "should reject {candidate}");
        }
    }

    #[test]
    fn test_unc_rejected() {
        let (_temp, base) = create_test_base();
        for candidate in [r"\\?\C:\secret", r"\\server\share\file"] {
            let result = try_validate(candidate, &base, &SanitizeOptions::default());
            assert!(
                matches!(result, Err(SecurityError::BlockedPattern { .. })),
                "should reject {candidate}"
            );
        }
    }

    #[test]
    fn test_separator_normalization() {
        let (_temp, base) = create_test_base();
        let resolved =
            try_validate("locales\\\\en//app.json/", &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("locales/en/app.json"));
    }

    #[test]
    fn test_dot_components_removed() {
        let (_temp, base) = create_test_base();
        let resolved = try_validate("./a/./b.txt", &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("a/b.txt"));
    }

    #[test]
    fn test_base_itself() {
        let (_temp, base) = create_test_base();
        let resolved = try_validate(".", &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), base.as_path());
        assert!(resolved.is_base());
    }

    #[test]
    fn test_extension_allowlist() {
        let (_temp, base) = create_test_base();
        let options = SanitizeOptions::default().with_extensions([".json"]);

        assert!(try_validate("en.json", &base, &options).is_ok());
        assert!(try_validate("EN.JSON", &base, &options).is_ok());
        assert!(matches!(
            try_validate("app.js", &base, &options),
            Err(SecurityError::DisallowedExtension { .. })
        ));
        assert!(matches!(
            try_validate("Makefile", &base, &options),
            Err(SecurityError::DisallowedExtension { .. })
        ));
    }

    #[test]
    fn test_custom_pattern() {
        let (_temp, base) = create_test_base();
        let options = SanitizeOptions::default().with_pattern(Regex::new(r"node_modules").unwrap());

        let result = try_validate("node_modules/pkg/index.json", &base, &options);
        match result {
            Err(SecurityError::BlockedPattern { pattern, .. }) => {
                assert_eq!(pattern, "node_modules");
            }
            other => panic!("expected blocked pattern, got {other:?}"),
        }
    }

    #[test]
    fn test_control_characters_stripped_before_checks() {
        let (_temp, base) = create_test_base();
        let result = try_validate(".\0./secret", &base, &SanitizeOptions::default());
        assert!(matches!(result, Err(SecurityError::BlockedPattern { .. })));

        let resolved = try_validate("en\0.json", &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("en.json"));
    }

    #[test]
    fn test_create_if_not_exists() {
        let (_temp, base) = create_test_base();
        let options = SanitizeOptions {
            create_if_not_exists: true,
            ..Default::default()
        };
        let resolved = try_validate("deep/nested/file.json", &base, &options).unwrap();
        assert!(resolved.as_path().parent().unwrap().is_dir());
        assert!(!resolved.as_path().exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_in_parent_chain() {
        use std::os::unix::fs::symlink;

        let (temp, base) = create_test_base();
        let outside = TempDir::new().expect("failed to create outside dir");
        symlink(outside.path(), temp.path().join("escape")).expect("failed to create symlink");

        let result = try_validate("escape/evil.txt", &base, &SanitizeOptions::default());
        assert!(
            matches!(result, Err(SecurityError::SymlinkEscape { .. })),
            "symlink in parent chain should be rejected: {result:?}"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_create_if_not_exists_does_not_follow_escape() {
        use std::os::unix::fs::symlink;

        let (temp, base) = create_test_base();
        let outside = TempDir::new().expect("failed to create outside dir");
        symlink(outside.path(), temp.path().join("escape")).expect("failed to create symlink");

        let options = SanitizeOptions {
            create_if_not_exists: true,
            ..Default::default()
        };
        let result = try_validate("escape/sub/evil.txt", &base, &options);
        assert!(result.is_err());
        assert!(!outside.path().join("sub").exists(), "must not create outside");
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_lexically_ignores_symlinks() {
        use std::os::unix::fs::symlink;

        let (temp, base) = create_test_base();
        let outside = TempDir::new().expect("failed to create outside dir");
        symlink(outside.path(), temp.path().join("escape")).expect("failed to create symlink");

        let resolved =
            validate_lexically("escape", &base, &SanitizeOptions::default()).unwrap();
        assert_eq!(resolved.as_path(), base.as_path().join("escape"));
        assert!(try_validate("escape", &base, &SanitizeOptions::default()).is_err());
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_separators("a\\b"), "a/b");
        assert_eq!(normalize_separators("a///b"), "a/b");
        assert_eq!(normalize_separators("a/b///"), "a/b");
        assert_eq!(normalize_separators("//"), "/");
        assert_eq!(normalize_separators("file.txt"), "file.txt");
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_lexically(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/tmp/proj/a/b.json"), Path::new("/tmp/proj")),
            PathBuf::from("a/b.json")
        );
        assert_eq!(
            relative_to(Path::new("/etc/passwd"), Path::new("/tmp/proj")),
            PathBuf::from("../../etc/passwd")
        );
        assert_eq!(
            relative_to(Path::new("/tmp/proj"), Path::new("/tmp/proj")),
            PathBuf::new()
        );
    }
}
