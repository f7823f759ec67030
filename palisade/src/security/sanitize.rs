// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde_json::Value;

const DANGEROUS_URL_SCHEMES: [&str; 5] = ["javascript:", "data:", "vbscript:", "file:", "about:"];
const SAFE_URL_PREFIXES: [&str; 5] = ["http://", "https://", "/", "#", "?"];

/// Sanitize free-form text for storage or plain-text display.
///
/// Trims, replaces NUL and C0/C1 control characters (except TAB/LF/CR) with a
/// space, and collapses whitespace runs to a single space.
pub fn sanitize_plain_text(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|ch| {
            if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
                ' '
            } else {
                ch
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Normalize an email address. Format validation is a separate concern,
/// see `validate_email_field`.
pub fn sanitize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Keep only characters that can appear in a phone number:
/// digits, spaces, hyphens, parentheses, and `+`.
pub fn sanitize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '-' | '(' | ')' | '+'))
        .collect()
}

/// Parse the longest leading numeric prefix of the input as a float.
///
/// `"12.5abc"` parses to `12.5`; returns `None` when no prefix parses
/// or the result is NaN.
pub fn sanitize_number(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let candidate_len = trimmed
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(*b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();

    let mut end = candidate_len;
    while end > 0 {
        if let Ok(value) = trimmed[..end].parse::<f64>() {
            if value.is_nan() {
                return None;
            }
            return Some(value);
        }
        end -= 1;
    }
    None
}

/// Parse the leading base-10 integer prefix of the input.
///
/// Fractional tails are dropped: `"123.45"` parses to `123`.
pub fn sanitize_integer(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();

    let start = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let digits = bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    trimmed[..start + digits].parse::<i64>().ok()
}

/// Numeric sanitization over a dynamic JSON value: numbers pass through,
/// strings are parsed, everything else is rejected.
pub fn sanitize_number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => sanitize_number(s),
        _ => None,
    }
}

/// Like `sanitize_number_value`, but a numeric value must be exactly
/// integral: `123.45` is rejected while the string `"123.45"` parses to `123`.
pub fn sanitize_integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            // Floats are acceptable only when exactly integral.
            // i64::MAX as f64 rounds up to 2^63, so the upper bound must be
            // strict to keep unrepresentable values out.
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64),
        },
        Value::String(s) => sanitize_integer(s),
        _ => None,
    }
}

/// Remove complete `<...>` spans. An unmatched `<` is left in place.
///
/// This is display stripping only; it carries no HTML-parser semantics and is
/// not a security boundary on its own.
pub fn strip_html_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) => {
                output.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    output.push_str(rest);
    output
}

pub(crate) fn has_dangerous_scheme(lowercased: &str) -> bool {
    DANGEROUS_URL_SCHEMES
        .iter()
        .any(|scheme| lowercased.starts_with(scheme))
}

/// Sanitize a URL for use in an `href`/`src` context.
///
/// Dangerous schemes (`javascript:`, `data:`, `vbscript:`, `file:`, `about:`)
/// and anything outside the allow-list (`http://`, `https://`, relative paths,
/// fragments, queries) collapse to the safe placeholder `#`.
pub fn sanitize_url(url: &str) -> String {
    let trimmed = url.trim();

    if has_dangerous_scheme(&trimmed.to_lowercase()) {
        return "#".to_string();
    }

    if !SAFE_URL_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
    {
        return "#".to_string();
    }

    trimmed.to_string()
}

/// Options for `sanitize_object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Apply `sanitize_plain_text` to string leaves.
    pub sanitize_strings: bool,
    /// Apply `sanitize_url` to string leaves whose key contains `url` or
    /// `link`. Takes priority over plain-text sanitization for those keys.
    pub sanitize_urls: bool,
    /// Recursion bound. `0` disables the walk entirely.
    pub max_depth: u32,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        SanitizeOptions {
            sanitize_strings: true,
            sanitize_urls: false,
            max_depth: 10,
        }
    }
}

/// Depth-bounded recursive sanitization of a JSON value.
///
/// Maps and arrays are walked structurally; string leaves are rewritten
/// according to `options`; numbers, booleans, and nulls pass through.
pub fn sanitize_object(value: &Value, options: &SanitizeOptions) -> Value {
    sanitize_value(value, options, options.max_depth)
}

fn sanitize_value(value: &Value, options: &SanitizeOptions, depth: u32) -> Value {
    if depth == 0 {
        return value.clone();
    }

    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::with_capacity(map.len());
            for (key, entry) in map {
                sanitized.insert(key.clone(), sanitize_map_entry(key, entry, options, depth));
            }
            Value::Object(sanitized)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_array_item(item, options, depth))
                .collect(),
        ),
        Value::String(s) if options.sanitize_strings => Value::String(sanitize_plain_text(s)),
        other => other.clone(),
    }
}

fn sanitize_map_entry(key: &str, value: &Value, options: &SanitizeOptions, depth: u32) -> Value {
    match value {
        Value::String(s) => {
            if options.sanitize_urls && (key.contains("url") || key.contains("link")) {
                Value::String(sanitize_url(s))
            } else if options.sanitize_strings {
                Value::String(sanitize_plain_text(s))
            } else {
                value.clone()
            }
        }
        Value::Object(_) | Value::Array(_) => sanitize_value(value, options, depth - 1),
        other => other.clone(),
    }
}

fn sanitize_array_item(item: &Value, options: &SanitizeOptions, depth: u32) -> Value {
    match item {
        // Array elements have no key, so URL-by-key never applies here.
        Value::String(s) if options.sanitize_strings => Value::String(sanitize_plain_text(s)),
        Value::Object(_) | Value::Array(_) => sanitize_value(item, options, depth - 1),
        other => other.clone(),
    }
}
