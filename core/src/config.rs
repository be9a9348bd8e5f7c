//! Client settings, given explicitly or read from the environment.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::types::DEFAULT_API_VERSION;

pub const URL_ENV: &str = "OPENPROJECT_URL";
pub const API_KEY_ENV: &str = "OPENPROJECT_API_KEY";
pub const API_VERSION_ENV: &str = "OPENPROJECT_API_VERSION";
pub const TIMEOUT_ENV: &str = "OPENPROJECT_TIMEOUT_SECS";

/// Everything needed to construct a [`Client`](crate::Client).
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Upper bound for a whole request/response exchange.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            api_version: default_api_version(),
            timeout: None,
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `OPENPROJECT_URL` and `OPENPROJECT_API_KEY`, plus the optional
    /// `OPENPROJECT_API_VERSION` and `OPENPROJECT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(required(URL_ENV)?, required(API_KEY_ENV)?);
        if let Some(version) = lookup(API_VERSION_ENV) {
            config.api_version = version;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ApiError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got {secs:?}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}
