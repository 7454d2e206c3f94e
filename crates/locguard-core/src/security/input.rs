//! Free-text input sanitization.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::InputOptions;

#[allow(clippy::expect_used)]
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script block pattern")
});

#[allow(clippy::expect_used)]
static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?script(?:\b[^>]*>?)?").expect("valid script tag pattern")
});

#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^<>]*>").expect("valid tag pattern"));

#[allow(clippy::expect_used)]
static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bon[a-z]{3,}\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("valid event handler pattern")
});

#[allow(clippy::expect_used)]
static SCRIPT_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:javascript|vbscript)\s*:").expect("valid scheme pattern")
});

#[allow(clippy::expect_used)]
static EVAL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\beval\s*\(").expect("valid eval pattern"));

/// Removes script-injection constructs from free text.
///
/// Strips `<script>` blocks and stray script tags, inline event handlers,
/// `javascript:`/`vbscript:` schemes and `eval(` calls. With
/// `strip_tags` it also removes any other HTML-like tag. Ordinary prose,
/// punctuation and Unicode pass through unchanged, including a lone `<` as in
/// `a < b`.
///
/// Passes repeat until the text stops changing, so nested payloads such as
/// `<scr<script>ipt>` cannot reassemble. `max_length` truncates by
/// characters after sanitizing.
///
/// # Examples
///
/// ```
/// use locguard_core::InputOptions;
/// use locguard_core::security::sanitize_input;
///
/// let options = InputOptions::default();
/// assert_eq!(
///     sanitize_input("Hello <script>alert(1)</script>world", &options),
///     "Hello world"
/// );
/// assert_eq!(sanitize_input("Grüße, 2 < 3!", &options), "Grüße, 2 < 3!");
/// ```
#[must_use]
pub fn sanitize_input(input: &str, options: &InputOptions) -> String {
    let mut text: String = input
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();

    loop {
        let next = sanitize_pass(&text, options.strip_tags);
        if next == text {
            break;
        }
        text = next;
    }

    match options.max_length {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}

fn sanitize_pass(text: &str, strip_tags: bool) -> String {
    let mut out = replace(text, &SCRIPT_BLOCK);
    out = replace(&out, &SCRIPT_TAG);
    out = replace(&out, &EVENT_HANDLER);
    if strip_tags {
        out = replace(&out, &HTML_TAG);
    }
    out = replace(&out, &SCRIPT_SCHEME);
    replace(&out, &EVAL_CALL)
}

fn replace(text: &str, pattern: &Regex) -> String {
    match pattern.replace_all(text, "") {
        Cow::Borrowed(unchanged) => unchanged.to_string(),
        Cow::Owned(changed) => changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(input: &str) -> String {
        sanitize_input(input, &InputOptions::default())
    }

    #[test]
    fn test_plain_text_untouched() {
        for text in [
            "Hello, world!",
            "Übersetzung fehlt: \"app.title\"",
            "日本語のテキスト",
            "2 < 3 and 5 > 4",
            "one = two",
            "multi\nline\ttext",
            "evaluate(this)",
        ] {
            assert_eq!(sanitize(text), text);
        }
    }

    #[test]
    fn test_script_block_removed() {
        assert_eq!(sanitize("a<script>alert(1)</script>b"), "ab");
        assert_eq!(
            sanitize("a<SCRIPT type=\"text/javascript\">\nx()\n</SCRIPT >b"),
            "ab"
        );
    }

    #[test]
    fn test_unclosed_script_tag_removed() {
        assert_eq!(sanitize("before<script src=x>"), "before");
        assert_eq!(sanitize("x</script>y"), "xy");
        assert_eq!(sanitize("<scriptx"), "x");
    }

    #[test]
    fn test_nested_payload_does_not_reassemble() {
        let result = sanitize("<scr<script>ipt>alert(1)</scr</script>ipt>");
        assert!(!result.to_lowercase().contains("<script"), "{result}");
    }

    #[test]
    fn test_event_handlers_removed() {
        let options = InputOptions {
            strip_tags: false,
            ..Default::default()
        };
        assert_eq!(
            sanitize_input("<img src=x onerror=\"alert(1)\">", &options),
            "<img src=x >"
        );
        assert_eq!(
            sanitize_input("<a onclick='go()' href=y>", &options),
            "<a  href=y>"
        );
    }

    #[test]
    fn test_schemes_removed() {
        assert_eq!(sanitize("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize("VBScript:msgbox"), "msgbox");
    }

    #[test]
    fn test_eval_removed() {
        assert_eq!(sanitize("eval(code)"), "code)");
        assert_eq!(sanitize("EVAL (code)"), "code)");
    }

    #[test]
    fn test_strip_tags_toggle() {
        assert_eq!(sanitize("<b>bold</b>"), "bold");

        let keep = InputOptions {
            strip_tags: false,
            ..Default::default()
        };
        assert_eq!(sanitize_input("<b>bold</b>", &keep), "<b>bold</b>");
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(sanitize("a\0b\u{7}c\r\n"), "abc\r\n");
        assert_eq!(sanitize("<scr\0ipt>x</script>"), "");
    }

    #[test]
    fn test_truncation_by_chars() {
        let options = InputOptions {
            max_length: Some(3),
            ..Default::default()
        };
        assert_eq!(sanitize_input("héllo", &options), "hél");
        assert_eq!(sanitize_input("日本語テキスト", &options), "日本語");
        assert_eq!(sanitize_input("ab", &options), "ab");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
