use std::{str::FromStr, time::Duration};

use thiserror::Error;

pub const API_URL_VAR: &str = "VOLLEY_API_URL";
pub const TIMEOUT_VAR: &str = "VOLLEY_API_TIMEOUT_SECS";
pub const MAX_RETRIES_VAR: &str = "VOLLEY_API_MAX_RETRIES";
pub const RETRY_BACKOFF_VAR: &str = "VOLLEY_API_RETRY_BACKOFF_MS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(API_URL_VAR))?;
        let mut config = Self::new(base_url.trim());
        if let Some(secs) = parse_var::<u64>(&lookup, TIMEOUT_VAR)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var::<u32>(&lookup, MAX_RETRIES_VAR)? {
            config.max_retries = retries;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, RETRY_BACKOFF_VAR)? {
            config.retry_backoff = Duration::from_millis(ms);
        }
        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid { name, value: raw })
}
