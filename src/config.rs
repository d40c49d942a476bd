//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DEV_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_FILE: &str = ".authgate-session.json";

pub const ENV_API_BASE_URL: &str = "AUTHGATE_API_BASE_URL";
pub const ENV_PRODUCTION: &str = "AUTHGATE_PRODUCTION";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "AUTHGATE_REQUEST_TIMEOUT_SECS";
pub const ENV_SESSION_FILE: &str = "AUTHGATE_SESSION_FILE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix joined in front of every request path. Empty means the paths are
    /// used as given.
    pub base_url: String,
    pub production: bool,
    pub request_timeout: Duration,
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: resolve_base_url(None, false),
            production: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl ClientConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `AUTHGATE_API_BASE_URL`: absolute URL, or a `/`-rooted path meaning "no prefix"
    /// - `AUTHGATE_PRODUCTION`: `1/true/yes/on` or `0/false/no/off`, default false
    /// - `AUTHGATE_REQUEST_TIMEOUT_SECS`: default 10
    /// - `AUTHGATE_SESSION_FILE`: default `.authgate-session.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the timeout is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = lookup(ENV_PRODUCTION).as_deref().and_then(parse_bool).unwrap_or(false);
        let base_url = resolve_base_url(lookup(ENV_API_BASE_URL).as_deref(), production);

        let request_timeout = match lookup(ENV_REQUEST_TIMEOUT_SECS) {
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidValue { var: ENV_REQUEST_TIMEOUT_SECS, value: raw }),
            },
        };

        let session_file = lookup(ENV_SESSION_FILE)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        Ok(Self { base_url, production, request_timeout, session_file })
    }
}

/// Resolve the request prefix.
///
/// An absolute value is used verbatim (minus trailing `/`). A `/`-rooted value
/// resolves to no prefix because request paths already carry it. With nothing
/// set, production builds are same-origin and development points at the local
/// backend.
#[must_use]
pub fn resolve_base_url(raw: Option<&str>, production: bool) -> String {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) if value.starts_with('/') => String::new(),
        Some(value) => value.trim_end_matches('/').to_owned(),
        None if production => String::new(),
        None => DEFAULT_DEV_BASE_URL.to_owned(),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
