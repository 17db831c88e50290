//! Streaming (WebSocket) client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Streaming client settings: heartbeat fallback and reconnect policy.
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Heartbeat interval used when the server's Hello omits one or sends
    /// an unusable value, in milliseconds.
    #[serde(default = "default_heartbeat_ms")]
    #[validate(range(min = 100))]
    pub default_heartbeat_ms: u64,
    /// First reconnect delay, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    #[validate(range(min = 1))]
    pub initial_backoff_ms: u64,
    /// Upper bound for the reconnect delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    #[validate(range(min = 1))]
    pub max_backoff_ms: u64,
    /// Growth factor applied after every failed attempt.
    #[serde(default = "default_multiplier")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub backoff_multiplier: f64,
    /// Timeout for the TCP/TLS/WebSocket handshake, in seconds.
    #[serde(default = "default_connect_timeout")]
    #[validate(range(min = 1))]
    pub connect_timeout_seconds: u64,
    /// Buffer size of channels that hand store updates to consumers.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            default_heartbeat_ms: default_heartbeat_ms(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_multiplier(),
            connect_timeout_seconds: default_connect_timeout(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

impl RealtimeConfig {
    /// Heartbeat fallback as a [`Duration`].
    pub fn default_heartbeat(&self) -> Duration {
        Duration::from_millis(self.default_heartbeat_ms)
    }

    /// Handshake timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

fn default_heartbeat_ms() -> u64 {
    10_000
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_channel_buffer() -> usize {
    64
}
