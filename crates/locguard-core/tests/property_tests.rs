//! Property-based tests for path validation and input sanitizing.
//!
//! These tests use proptest to generate arbitrary inputs and verify
//! security properties hold across a wide range of cases.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use locguard_core::InputOptions;
use locguard_core::PathGuard;
use locguard_core::SanitizeOptions;
use locguard_core::WriteOptions;
use locguard_core::audit::SecurityLogger;
use locguard_core::security::sanitize_input;
use locguard_core::security::try_validate;
use locguard_core::types::TrustedBase;
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_base() -> (TempDir, TrustedBase) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let base = TrustedBase::new(temp.path()).expect("failed to create base");
    (temp, base)
}

proptest! {
    /// Any path with a `..` segment is rejected, whatever the separators.
    #[test]
    fn prop_parent_traversal_rejected(
        prefix in prop::collection::vec("[a-z]{1,8}", 0..4),
        suffix in prop::collection::vec("[a-z]{1,8}", 0..4),
        separators in prop::collection::vec(prop::sample::select(vec!['/', '\\']), 8),
    ) {
        let (_temp, base) = create_test_base();
        let mut candidate = String::new();
        for (i, part) in prefix.iter().enumerate() {
            candidate.push_str(part);
            candidate.push(separators[i % separators.len()]);
        }
        candidate.push_str("..");
        for (i, part) in suffix.iter().enumerate() {
            candidate.push(separators[(i + 4) % separators.len()]);
            candidate.push_str(part);
        }

        let result = try_validate(&candidate, &base, &SanitizeOptions::default());
        prop_assert!(result.is_err(), "path with .. should be rejected: {}", candidate);
    }

    /// Plain relative paths are accepted and stay inside the base.
    #[test]
    fn prop_valid_relative_paths_accepted(
        components in prop::collection::vec("[a-zA-Z0-9_-]{1,20}", 1..6)
    ) {
        let (_temp, base) = create_test_base();
        let candidate = components.join("/");
        let resolved = try_validate(&candidate, &base, &SanitizeOptions::default())
            .expect("valid path should be accepted");
        prop_assert_eq!(resolved.as_path(), base.as_path().join(&candidate));
        prop_assert!(resolved.as_path().starts_with(base.as_path()));
    }

    /// Validating a validated path returns the same path.
    #[test]
    fn prop_validation_idempotent(
        components in prop::collection::vec("[a-z0-9.]{1,12}", 1..5)
    ) {
        let (_temp, base) = create_test_base();
        let candidate = components.join("/");
        if let Ok(first) = try_validate(&candidate, &base, &SanitizeOptions::default()) {
            let again = try_validate(
                first.as_path().to_str().expect("utf-8 path"),
                &base,
                &SanitizeOptions::default(),
            )
            .expect("validated path should validate again");
            prop_assert_eq!(first, again);
        }
    }

    /// No accepted path ever escapes the base, even with traversal checks off.
    #[test]
    fn prop_accepted_paths_contained(
        parts in prop::collection::vec(prop_oneof![
            Just("..".to_string()),
            Just(".".to_string()),
            "[a-z]{1,6}",
        ], 1..8)
    ) {
        let (_temp, base) = create_test_base();
        let options = SanitizeOptions {
            allow_traversal: true,
            ..Default::default()
        };
        let candidate = parts.join("/");
        if let Ok(resolved) = try_validate(&candidate, &base, &options) {
            prop_assert!(resolved.as_path().starts_with(base.as_path()));
            prop_assert!(!resolved.relative().starts_with(".."));
        }
    }

    /// The sanitizer never leaves a script tag or a disallowed control char.
    #[test]
    fn prop_sanitized_input_has_no_script(input in ".{0,200}") {
        let output = sanitize_input(&input, &InputOptions::default());
        prop_assert!(!output.to_lowercase().contains("<script"));
        prop_assert!(output
            .chars()
            .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t')));
    }

    /// Whatever is written through the guard reads back unchanged.
    #[test]
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    fn prop_write_read_round_trip(
        content in any::<String>(),
        components in prop::collection::vec("[a-z0-9_-]{1,10}", 1..4),
    ) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let guard = PathGuard::new(temp.path())
            .unwrap()
            .with_logger(Arc::new(SecurityLogger::new("round-trip")));
        let candidate = format!("{}.json", components.join("/"));

        prop_assert!(guard.write(&candidate, &content, &WriteOptions::default()));
        let read = guard.read_to_string(&candidate, &SanitizeOptions::default());
        prop_assert_eq!(read.as_deref(), Some(content.as_str()));
    }

    /// Truncation is measured in characters.
    #[test]
    fn prop_sanitized_input_respects_max_length(
        input in "[a-zA-Zäöüß日本 ]{0,100}",
        max in 0usize..50,
    ) {
        let options = InputOptions { max_length: Some(max), strip_tags: true };
        let output = sanitize_input(&input, &options);
        prop_assert!(output.chars().count() <= max);
        prop_assert!(input.starts_with(&output));
    }
}
