//! Client configuration.
//!
//! Configuration is an explicit value handed to constructors; nothing is read
//! from process globals except through [`ClientConfig::from_env`].

use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.redislabs.com/v1";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "STRATUS_API_KEY";
/// Environment variable holding the API secret key.
pub const SECRET_KEY_VAR: &str = "STRATUS_SECRET_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "STRATUS_BASE_URL";
/// Environment variable overriding the user agent.
pub const USER_AGENT_VAR: &str = "STRATUS_USER_AGENT";
/// Environment variable overriding the request timeout, in milliseconds.
pub const REQUEST_TIMEOUT_VAR: &str = "STRATUS_REQUEST_TIMEOUT_MS";
/// Environment variable overriding the poll interval, in milliseconds.
pub const POLL_INTERVAL_VAR: &str = "STRATUS_POLL_INTERVAL_MS";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {name}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Connection settings for the remote task API.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: String,
    secret_key: String,
    user_agent: String,
    request_timeout: Duration,
    poll_interval: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration with credentials and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            user_agent: default_user_agent(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: crate::lifecycle::services::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Loads configuration from `STRATUS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when a credential is absent and
    /// [`ConfigError::InvalidVar`] when a duration is not a whole number of
    /// milliseconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required(API_KEY_VAR)?;
        let secret_key = required(SECRET_KEY_VAR)?;
        let mut config = Self::new(api_key, secret_key);
        if let Some(base_url) = optional(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        if let Some(user_agent) = optional(USER_AGENT_VAR) {
            config = config.with_user_agent(user_agent);
        }
        if let Some(timeout) = millis(REQUEST_TIMEOUT_VAR)? {
            config = config.with_request_timeout(timeout);
        }
        if let Some(interval) = millis(POLL_INTERVAL_VAR)? {
            config = config.with_poll_interval(interval);
        }
        Ok(config)
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the pause between task polls.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Returns the user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the pause between task polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

fn default_user_agent() -> String {
    format!("stratus/{}", env!("CARGO_PKG_VERSION"))
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

fn millis(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    optional(name)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidVar { name, value })
        })
        .transpose()
}
