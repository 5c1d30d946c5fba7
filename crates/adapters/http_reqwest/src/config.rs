//! HTTP client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the hub REST client.
///
/// Paths are relative to `{base_url}/api/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Upper bound for a whole request, connect to last body byte.
    pub timeout_ms: u64,
    /// Prefix of the state read endpoint; the entity id is appended.
    pub state_path: String,
    /// Path of the text command endpoint.
    pub command_path: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            state_path: "states".to_string(),
            command_path: "services/text/set_value".to_string(),
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
