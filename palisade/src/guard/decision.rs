// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::GuardConfig;

/// True when the path requires an authenticated session.
pub fn is_protected_route(config: &GuardConfig, path: &str) -> bool {
    config
        .protected_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
}

/// True when the path is reserved for unauthenticated visitors
/// (login, register, password reset, email verification).
pub fn is_auth_route(config: &GuardConfig, path: &str) -> bool {
    config
        .auth_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
}

/// Decide whether a request should be redirected.
///
/// A protected path without a session goes to the login page; an auth-only
/// path with a session goes to the dashboard; everything else passes through.
/// The protected check runs first, so it wins if the prefix lists ever
/// overlap.
pub fn decide<'a>(config: &'a GuardConfig, path: &str, authenticated: bool) -> Option<&'a str> {
    if is_protected_route(config, path) && !authenticated {
        return Some(config.login_path.as_str());
    }

    if is_auth_route(config, path) && authenticated {
        return Some(config.dashboard_path.as_str());
    }

    None
}
