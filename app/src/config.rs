//! Configuration management for the ExpoHub shell.
//!
//! Loads configuration from environment variables (after `.env`) with
//! sensible defaults.

use expohub_client::Url;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Backend used when `EXPOHUB_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// Log filter used when `EXPOHUB_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "expohub=info";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A URL variable does not hold an absolute URL.
    #[error("{var} is not a valid URL ({value}): {reason}")]
    InvalidUrl {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// Parse error.
        reason: String,
    },

    /// No session file was configured and there is no home directory.
    #[error("EXPOHUB_SESSION_FILE is not set and no home directory is available")]
    NoSessionFile,
}

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL, always ending in `/`.
    pub api_url: String,
    /// File holding the persisted session.
    pub session_file: PathBuf,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = base_url(
            non_empty("EXPOHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;

        let session_file = match non_empty("EXPOHUB_SESSION_FILE") {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .map(|home| home.join(".expohub").join("session.json"))
                .ok_or(ConfigError::NoSessionFile)?,
        };

        Ok(Self {
            api_url,
            session_file,
            log_filter: non_empty("EXPOHUB_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Replace the backend URL, as `--api-url` does.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `api_url` is not an absolute URL.
    pub fn with_api_url(self, api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: base_url(api_url.trim().to_string())?,
            ..self
        })
    }
}

/// Validate a base URL and make sure it ends in `/`.
fn base_url(mut value: String) -> Result<String, ConfigError> {
    if !value.ends_with('/') {
        value.push('/');
    }
    match Url::parse(&value) {
        Ok(_) => Ok(value),
        Err(e) => Err(ConfigError::InvalidUrl {
            var: "EXPOHUB_API_URL",
            value,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_lookup(lookup(&[
            ("EXPOHUB_API_URL", "https://expo.example.com/api"),
            ("EXPOHUB_SESSION_FILE", "/tmp/expohub/session.json"),
            ("EXPOHUB_LOG", "expohub=debug"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://expo.example.com/api/");
        assert_eq!(config.session_file, PathBuf::from("/tmp/expohub/session.json"));
        assert_eq!(config.log_filter, "expohub=debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("EXPOHUB_SESSION_FILE", "session.json")]))
            .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("EXPOHUB_API_URL", "  "),
            ("EXPOHUB_SESSION_FILE", "s.json"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_url() {
        let err = Config::from_lookup(lookup(&[
            ("EXPOHUB_API_URL", "expo.example.com"),
            ("EXPOHUB_SESSION_FILE", "s.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "EXPOHUB_API_URL", .. }));
    }

    #[test]
    fn test_api_url_override() {
        let config = Config::from_lookup(lookup(&[("EXPOHUB_SESSION_FILE", "s.json")]))
            .unwrap()
            .with_api_url("https://staging.example.com/api")
            .unwrap();
        assert_eq!(config.api_url, "https://staging.example.com/api/");
        assert_eq!(config.session_file, PathBuf::from("s.json"));
    }
}
