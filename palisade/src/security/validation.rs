// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use validator::{ValidateEmail, ValidateUrl};

use super::sanitize::sanitize_url;

pub const MAX_EMAIL_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 256;

/// Validate user email input
pub fn validate_email_field(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_CHARS
        ));
    }
    if !trimmed.validate_email() {
        return Err("Email format is invalid".to_string());
    }
    Ok(())
}

/// Validate a user-supplied URL field.
///
/// Beyond a well-formedness check, the value must survive `sanitize_url`
/// unchanged: a syntactically valid `javascript:` URL is still rejected.
pub fn validate_url_field(url: &str) -> Result<(), String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err("URL is required".to_string());
    }
    if !trimmed.validate_url() {
        return Err("URL format is invalid".to_string());
    }
    if sanitize_url(trimmed) != trimmed {
        return Err("URL scheme is not allowed".to_string());
    }
    Ok(())
}

/// Validate and sanitize display names for safe rendering.
///
/// Allows letters, numbers, spaces, apostrophes, hyphens, and periods;
/// everything else becomes a space, runs of whitespace collapse, and the
/// result must be 2 to `MAX_NAME_CHARS` characters long.
pub fn validate_and_sanitize_display_name(name: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    let replaced: String = name
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, ' ' | '\'' | '-' | '.') {
                ch
            } else {
                ' '
            }
        })
        .collect();
    let sanitized = replaced.split_whitespace().collect::<Vec<&str>>().join(" ");

    let length = sanitized.chars().count();
    if !(2..=MAX_NAME_CHARS).contains(&length) {
        return Err(format!(
            "Name must be between 2 and {} characters",
            MAX_NAME_CHARS
        ));
    }

    Ok(sanitized)
}
