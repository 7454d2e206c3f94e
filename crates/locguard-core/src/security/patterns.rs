//! Lexical screening of untrusted path strings.
//!
//! These checks run on the raw candidate *before* any normalization so that
//! separator tricks cannot smuggle a traversal past `Path` handling.

/// Shell metacharacters that are never accepted in a candidate path.
pub const SHELL_METACHARACTERS: &[char] = &[
    '`', '$', '&', '|', ';', '<', '>', '\'', '"', '{', '}', '[', ']', '%',
];

/// Case-insensitive substrings that indicate injection rather than a path.
pub const INJECTION_MARKERS: &[&str] = &["<script", "javascript:", "data:", "file:"];

/// Removes NUL and every Unicode "other" (category C) character, then
/// collapses runs of whitespace into a single space.
///
/// # Examples
///
/// ```
/// use locguard_core::security::patterns::clean_candidate;
///
/// assert_eq!(clean_candidate("a\0b\u{200B}c"), "abc");
/// assert_eq!(clean_candidate("  my   file.txt "), "my file.txt");
/// ```
#[must_use]
pub fn clean_candidate(input: &str) -> String {
    let stripped: String = input.chars().filter(|&c| !is_other_category(c)).collect();
    collapse_whitespace(&stripped)
}

/// Collapses whitespace runs into one space and trims both ends.
#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` for characters in Unicode general category C: controls
/// (Cc), format characters (Cf), private-use code points (Co) and the
/// noncharacters of Cn.
#[must_use]
pub fn is_other_category(c: char) -> bool {
    c.is_control()
        || is_noncharacter(c)
        || matches!(
            c,
            '\u{00AD}'
                | '\u{0600}'..='\u{0605}'
                | '\u{061C}'
                | '\u{06DD}'
                | '\u{070F}'
                | '\u{180E}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206F}'
                | '\u{FEFF}'
                | '\u{FFF9}'..='\u{FFFB}'
                | '\u{E000}'..='\u{F8FF}'
                | '\u{E0001}'
                | '\u{E0020}'..='\u{E007F}'
                | '\u{F0000}'..='\u{FFFFD}'
                | '\u{100000}'..='\u{10FFFD}'
        )
}

/// `U+FDD0..=U+FDEF` plus the last two code points of every plane
/// (`U+FFFE`, `U+FFFF`, `U+1FFFE`, ...).
fn is_noncharacter(c: char) -> bool {
    let code = u32::from(c);
    (0xFDD0..=0xFDEF).contains(&code) || code & 0xFFFE == 0xFFFE
}

/// Returns the first blocked pattern found in `candidate`, if any.
///
/// When `check_traversal` is false the `..` checks are skipped; containment
/// in the base is still enforced later by the validator.
#[must_use]
pub fn find_blocked_pattern(candidate: &str, check_traversal: bool) -> Option<String> {
    if check_traversal {
        if candidate.contains("../") {
            return Some("../".to_string());
        }
        if candidate.contains("..\\") {
            return Some("..\\".to_string());
        }
        if candidate.split(['/', '\\']).any(|segment| segment == "..") {
            return Some("..".to_string());
        }
    }

    if let Some(prefix) = unc_prefix(candidate) {
        return Some(prefix.to_string());
    }

    let lowered = candidate.to_lowercase();
    if let Some(marker) = INJECTION_MARKERS.iter().find(|m| lowered.contains(*m)) {
        return Some((*marker).to_string());
    }

    candidate
        .chars()
        .find(|c| SHELL_METACHARACTERS.contains(c))
        .map(|c| c.to_string())
}

/// Detects `\\?\` / `\\.\` device paths and `\\server\share` UNC paths.
#[must_use]
pub fn unc_prefix(candidate: &str) -> Option<&'static str> {
    if candidate.starts_with(r"\\?\") {
        Some(r"\\?\")
    } else if candidate.starts_with(r"\\.\") {
        Some(r"\\.\")
    } else if candidate.starts_with(r"\\") {
        Some(r"\\")
    } else {
        None
    }
}

/// Returns `true` for Windows drive prefixes such as `C:\`, `c:/` or `C:`.
///
/// These are treated as absolute input on every platform.
#[must_use]
pub fn has_drive_prefix(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
