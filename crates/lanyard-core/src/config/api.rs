//! Lanyard API endpoint configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::id::Snowflake;

/// Where and how to reach the Lanyard API.
#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host (and optional port) of the API, without scheme.
    #[serde(default = "default_hostname")]
    #[validate(length(min = 1))]
    pub hostname: String,
    /// Use `https`/`wss` when true, `http`/`ws` otherwise.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            secure: default_true(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// REST endpoint for one user's presence.
    pub fn rest_url(&self, id: &Snowflake) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}/v1/users/{id}", self.hostname)
    }

    /// WebSocket endpoint.
    pub fn socket_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}/socket", self.hostname)
    }
}

fn default_hostname() -> String {
    "api.lanyard.rest".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    10
}
