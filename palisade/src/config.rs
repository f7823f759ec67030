// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Route-guard configuration: which paths require a session, which are
/// reserved for unauthenticated visitors, and where to send each group.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GuardConfig {
    /// Name of the access-token cookie whose presence marks a session.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Path prefixes that require an authenticated session.
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
    /// Path prefixes reserved for unauthenticated visitors (login, register, ...).
    #[serde(default = "default_auth_prefixes")]
    pub auth_prefixes: Vec<String>,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

fn default_protected_prefixes() -> Vec<String> {
    vec!["/dashboard".to_string()]
}

fn default_auth_prefixes() -> Vec<String> {
    vec![
        "/auth/login".to_string(),
        "/auth/register".to_string(),
        "/auth/forgot-password".to_string(),
        "/auth/new-password".to_string(),
        "/auth/verify-email".to_string(),
        "/auth/verify-email-otp".to_string(),
        "/auth/resend-verification-email".to_string(),
    ]
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_dashboard_path() -> String {
    "/dashboard".to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            cookie_name: default_cookie_name(),
            protected_prefixes: default_protected_prefixes(),
            auth_prefixes: default_auth_prefixes(),
            login_path: default_login_path(),
            dashboard_path: default_dashboard_path(),
        }
    }
}

impl GuardConfig {
    /// Check the configuration for values that would break redirect handling
    /// (malformed cookie names, prefixes that can never match, redirect loops).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "cookie_name cannot be empty".to_string(),
            ));
        }
        if !self.cookie_name.chars().all(is_cookie_name_char) {
            return Err(ConfigError::ValidationError(format!(
                "cookie_name '{}' contains characters not allowed in a cookie name",
                self.cookie_name
            )));
        }

        if self.protected_prefixes.is_empty() {
            return Err(ConfigError::ValidationError(
                "protected_prefixes cannot be empty".to_string(),
            ));
        }
        if self.auth_prefixes.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth_prefixes cannot be empty".to_string(),
            ));
        }
        for prefix in self.protected_prefixes.iter().chain(&self.auth_prefixes) {
            if !prefix.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "route prefix '{}' must start with '/'",
                    prefix
                )));
            }
        }

        // The login page must be an auth route and the dashboard a protected
        // route, otherwise a redirect can land on a path the guard bounces
        // straight back.
        if !self
            .auth_prefixes
            .iter()
            .any(|prefix| self.login_path.starts_with(prefix.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "login_path '{}' is not covered by any auth prefix",
                self.login_path
            )));
        }
        if !self
            .protected_prefixes
            .iter()
            .any(|prefix| self.dashboard_path.starts_with(prefix.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "dashboard_path '{}' is not covered by any protected prefix",
                self.dashboard_path
            )));
        }

        Ok(())
    }
}

// RFC 6265 cookie names are HTTP tokens.
fn is_cookie_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub guard: GuardConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    pub fn load_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.guard.validate()?;
        Ok(config)
    }
}
