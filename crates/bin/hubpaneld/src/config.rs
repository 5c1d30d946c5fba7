//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `hubpanel.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use hubpanel_adapter_http_reqwest::HttpClientConfig;
use hubpanel_app::poller::PollerConfig;
use hubpanel_domain::catalog::Catalog;
use hubpanel_domain::credentials::Credentials;
use hubpanel_domain::error::ValidationError;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial hub credentials.
    pub hub: HubConfig,
    /// Refresh timer settings.
    pub polling: PollingConfig,
    /// HTTP client settings.
    pub http: HttpClientConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Sensor groups and speaker profiles.
    pub catalog: Catalog,
}

/// Hub credentials used at startup. Both parts must be set to log in.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL (e.g. `http://192.168.0.3:8123`).
    pub base_url: String,
    /// Long-lived access token.
    pub token: String,
}

impl fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Poller timer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two timer-driven refreshes.
    pub interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `hubpanel.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, if an
    /// override is not a number where one is expected, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("hubpanel.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(val) = lookup("HUBPANEL_URL") {
            self.hub.base_url = val;
        }
        if let Some(val) = lookup("HUBPANEL_TOKEN") {
            self.hub.token = val;
        }
        if let Some(val) = lookup("HUBPANEL_POLL_INTERVAL") {
            self.polling.interval_secs = parse_number("HUBPANEL_POLL_INTERVAL", &val)?;
        }
        if let Some(val) = lookup("HUBPANEL_TIMEOUT_MS") {
            self.http.timeout_ms = parse_number("HUBPANEL_TIMEOUT_MS", &val)?;
        }
        if let Some(val) = lookup("HUBPANEL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling interval must be non-zero".to_string(),
            ));
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "http timeout must be non-zero".to_string(),
            ));
        }
        self.catalog.validate()?;
        Ok(())
    }

    /// Startup credentials, when both parts are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(&self.hub.base_url, &self.hub.token)
    }

    #[must_use]
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.polling.interval_secs),
        }
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hubpaneld=info,hubpanel=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// An environment override is not a valid number.
    #[error("environment variable {key} must be a number, got {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    /// The catalog breaks an invariant.
    #[error("invalid catalog")]
    Catalog(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
