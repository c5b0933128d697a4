//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
/// Storage key the auth token is persisted under.
pub const AUTH_TOKEN_KEY: &str = "library_auth_token";

const STORAGE_DIR: &str = ".library-desk";
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Optional network timeouts; `None` leaves the reqwest default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `LIBRARY_API_BASE_URL`: default `http://localhost:8000`
    /// - `LIBRARY_TOKEN_FILE`: default `$HOME/.library-desk/storage.json`
    /// - `LIBRARY_REQUEST_TIMEOUT_SECS`: unset by default
    /// - `LIBRARY_CONNECT_TIMEOUT_SECS`: unset by default
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a timeout is not a whole number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("LIBRARY_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        let token_file = std::env::var("LIBRARY_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_file(std::env::var("HOME").ok().as_deref()));
        let timeouts = Timeouts {
            request: env_secs("LIBRARY_REQUEST_TIMEOUT_SECS")?,
            connect: env_secs("LIBRARY_CONNECT_TIMEOUT_SECS")?,
        };

        Ok(Self::new(base_url, token_file).with_timeouts(timeouts))
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>, token_file: impl Into<PathBuf>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            token_file: token_file.into(),
            timeouts: Timeouts::default(),
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn default_token_file(home: Option<&str>) -> PathBuf {
    let root = match home {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => PathBuf::from("."),
    };
    root.join(STORAGE_DIR).join(STORAGE_FILE)
}

fn env_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(None);
    };
    parse_secs(var, &raw).map(Some)
}

fn parse_secs(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue { var, value: raw.to_owned() })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
