// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod sanitize;
mod validation;
mod xss;

pub use sanitize::{
    SanitizeOptions, sanitize_email, sanitize_integer, sanitize_integer_value, sanitize_number,
    sanitize_number_value, sanitize_object, sanitize_phone, sanitize_plain_text, sanitize_url,
    strip_html_tags,
};
pub use validation::{
    MAX_EMAIL_CHARS, MAX_NAME_CHARS, validate_and_sanitize_display_name, validate_email_field,
    validate_url_field,
};
pub use xss::{
    SafeHtml, escape_css, escape_html, escape_html_attribute, escape_javascript, escape_url,
    generate_csp_nonce, is_safe_for_inline_script, safe_attribute_value, safe_data_attribute,
    safe_html_fragment, safe_json_parse, sanitize_for_render,
};
