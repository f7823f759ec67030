// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use once_cell::sync::Lazy;
use rand::RngCore;
use rand::rngs::OsRng;
use regex::Regex;
use serde_json::Value;
use std::fmt::Write as _;

use super::sanitize::has_dangerous_scheme;

const ATTRIBUTE_URL_PREFIXES: [&str; 7] =
    ["http://", "https://", "/", "#", "?", "mailto:", "tel:"];

/// Escape HTML special characters for element content.
///
/// `& < > " ' /` become entities; everything else passes through unchanged.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape a value for an HTML attribute context.
///
/// The quote characters are already covered by `escape_html`; this exists as
/// a distinct entry point so attribute call sites read as such.
pub fn escape_html_attribute(input: &str) -> String {
    escape_html(input)
}

/// Escape a string for embedding inside an inline-script string literal.
pub fn escape_javascript(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape a string for a CSS value context using `\<hex> ` escapes.
pub fn escape_css(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' | '>' | '\'' | '"' => {
                // A trailing space terminates the hex escape.
                let _ = write!(escaped, "\\{:x} ", ch as u32);
            }
            other => escaped.push(other),
        }
    }
    escaped
}

/// URL sanitization for attribute contexts. Same deny-list as
/// `sanitize_url`, with `mailto:` and `tel:` additionally allowed.
pub fn escape_url(url: &str) -> String {
    let trimmed = url.trim();

    if has_dangerous_scheme(&trimmed.to_lowercase()) {
        return "#".to_string();
    }

    if !ATTRIBUTE_URL_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
    {
        return "#".to_string();
    }

    trimmed.to_string()
}

/// Prepare untrusted text for rendering: drop NUL and ASCII control
/// characters (TAB/LF/CR survive, as does everything above 0x7F), then
/// HTML-escape the rest.
pub fn sanitize_for_render(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|ch| !ch.is_ascii_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect();
    escape_html(&stripped)
}

pub fn safe_attribute_value(value: &str) -> String {
    escape_html_attribute(value)
}

/// JSON-encode a value and escape it for a `data-*` attribute.
pub fn safe_data_attribute(value: &str) -> String {
    let encoded = serde_json::to_string(value).unwrap_or_default();
    escape_html_attribute(&encoded)
}

static DANGEROUS_CONTENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<script",
        r"(?i)javascript:",
        r"(?i)\bon\w+\s*=",
        r"(?i)<iframe",
        r"(?i)<object",
        r"(?i)<embed",
        r"(?i)expression\s*\(",
        r"(?i)vbscript:",
        r"(?i)data:text/html",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("dangerous content pattern must compile"))
    .collect()
});

/// Returns `false` when the content matches any known inline-script danger
/// pattern (script/iframe/object/embed tags, script-capable schemes, event
/// handler attributes, CSS expressions).
pub fn is_safe_for_inline_script(content: &str) -> bool {
    !DANGEROUS_CONTENT_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(content))
}

/// Generate a CSP nonce: 16 bytes from the OS CSPRNG, hex-encoded.
pub fn generate_csp_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(32), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

/// Parse JSON while refusing prototype-pollution payloads.
///
/// Quoted `__proto__`/`constructor` literals are neutralized before parsing;
/// if the parsed value is a non-array object that still owns either key
/// (e.g. smuggled through unicode escapes), the whole value is rejected.
/// Malformed JSON returns `None`.
pub fn safe_json_parse(input: &str) -> Option<Value> {
    let cleaned = input
        .replace("\"__proto__\"", "\"__removed__\"")
        .replace("\"constructor\"", "\"__removed__\"");

    let parsed: Value = serde_json::from_str(&cleaned).ok()?;

    if let Value::Object(map) = &parsed {
        if map.contains_key("__proto__") || map.contains_key("constructor") {
            return None;
        }
    }

    Some(parsed)
}

/// An HTML fragment that has been through `sanitize_for_render`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml {
    pub html: String,
}

/// Build a `SafeHtml` wrapper for sinks that render raw markup.
pub fn safe_html_fragment(content: &str) -> SafeHtml {
    SafeHtml {
        html: sanitize_for_render(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">&'/"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;&#x2F;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn escaped_output_has_no_raw_specials() {
        let escaped = escape_html("<script>alert(\"x\")</script>");
        for ch in ['<', '>', '"', '\'', '/'] {
            assert!(!escaped.contains(ch), "raw '{}' in {}", ch, escaped);
        }
    }

    #[test]
    fn escapes_javascript_string_contexts() {
        assert_eq!(escape_javascript("a\\b"), "a\\\\b");
        assert_eq!(escape_javascript("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_javascript("it's \"q\""), "it\\'s \\\"q\\\"");
        assert_eq!(escape_javascript("\u{2028}\u{2029}"), "\\u2028\\u2029");
    }

    #[test]
    fn escapes_css_contexts() {
        assert_eq!(escape_css("a<b"), "a\\3c b");
        assert_eq!(escape_css("\"quoted\""), "\\22 quoted\\22 ");
        assert_eq!(escape_css("safe-value"), "safe-value");
    }

    #[test]
    fn attribute_url_variant_allows_mailto_and_tel() {
        assert_eq!(escape_url("mailto:a@b.c"), "mailto:a@b.c");
        assert_eq!(escape_url("tel:+15551234"), "tel:+15551234");
        assert_eq!(escape_url("javascript:alert(1)"), "#");
        assert_eq!(escape_url("DATA:text/html,x"), "#");
        assert_eq!(escape_url("example.com"), "#");
        assert_eq!(escape_url("/ok"), "/ok");
    }

    #[test]
    fn render_sanitizer_strips_controls_then_escapes() {
        assert_eq!(sanitize_for_render("a\u{0}b<c"), "ab&lt;c");
        assert_eq!(sanitize_for_render("tab\tok"), "tab\tok");
        // Characters above 0x7F pass through.
        assert_eq!(sanitize_for_render("café"), "café");
        assert_eq!(sanitize_for_render("x\u{7f}y"), "xy");
    }

    #[test]
    fn data_attribute_is_json_encoded_and_escaped() {
        let value = safe_data_attribute("say \"hi\"");
        assert!(!value.contains('"'));
        assert!(value.starts_with("&quot;"));
    }

    #[test]
    fn flags_dangerous_inline_content() {
        assert!(!is_safe_for_inline_script("<script>x</script>"));
        assert!(!is_safe_for_inline_script("<SCRIPT src=x>"));
        assert!(!is_safe_for_inline_script("javascript:void(0)"));
        assert!(!is_safe_for_inline_script("<img onerror=alert(1)>"));
        assert!(!is_safe_for_inline_script("<iframe src=x>"));
        assert!(!is_safe_for_inline_script("<object data=x>"));
        assert!(!is_safe_for_inline_script("<embed src=x>"));
        assert!(!is_safe_for_inline_script("width: expression(alert(1))"));
        assert!(!is_safe_for_inline_script("vbscript:msgbox"));
        assert!(!is_safe_for_inline_script("data:text/html,<p>"));
    }

    #[test]
    fn accepts_benign_inline_content() {
        assert!(is_safe_for_inline_script("const x = 1;"));
        assert!(is_safe_for_inline_script("window.config = {};"));
        assert!(is_safe_for_inline_script(""));
    }

    #[test]
    fn nonce_is_32_hex_characters() {
        let nonce = generate_csp_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn nonces_are_unique_across_calls() {
        let nonces: HashSet<String> = (0..1000).map(|_| generate_csp_nonce()).collect();
        assert_eq!(nonces.len(), 1000);
    }

    #[test]
    fn json_parse_neutralizes_proto_keys() {
        let parsed = safe_json_parse(r#"{"key":"value","__proto__":{"polluted":true}}"#).unwrap();
        let map = parsed.as_object().unwrap();
        assert!(!map.contains_key("__proto__"));
        assert_eq!(map["key"], "value");
        assert_eq!(map["__removed__"], json!({"polluted": true}));
    }

    #[test]
    fn json_parse_rejects_escaped_proto_smuggling() {
        // _ decodes to '_', bypassing the textual replacement; the
        // post-parse ownership check still catches the key.
        assert_eq!(safe_json_parse("{\"\\u005f\\u005fproto__\":{}}"), None);
        assert_eq!(safe_json_parse("{\"\\u0063onstructor\":{}}"), None);
    }

    #[test]
    fn json_parse_handles_ordinary_values() {
        assert_eq!(safe_json_parse("[1,2,3]"), Some(json!([1, 2, 3])));
        assert_eq!(safe_json_parse(r#"{"a":1}"#), Some(json!({"a": 1})));
        assert_eq!(safe_json_parse("not json"), None);
        assert_eq!(safe_json_parse(""), None);
    }

    #[test]
    fn safe_html_fragment_wraps_sanitized_markup() {
        let fragment = safe_html_fragment("<b>bold\u{0}</b>");
        assert_eq!(fragment.html, "&lt;b&gt;bold&lt;&#x2F;b&gt;");
    }
}
