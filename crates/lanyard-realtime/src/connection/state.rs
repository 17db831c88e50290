//! Streaming connection states.

use serde::Serialize;

/// Where the streaming client is in its lifecycle.
///
/// `Disconnected → Connecting → AwaitingHello → Heartbeating → Disconnected`
/// repeats until shutdown, which ends in `ShutDown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection; a reconnect may be pending.
    #[default]
    Disconnected,
    /// Opening the socket.
    Connecting,
    /// Socket open, waiting for the server's Hello.
    AwaitingHello,
    /// Hello received, subscribed and sending heartbeats.
    Heartbeating,
    /// Stopped by the caller. Terminal.
    ShutDown,
}

impl ConnectionState {
    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Heartbeating => "heartbeating",
            Self::ShutDown => "shut_down",
        }
    }

    /// Whether the client will never connect again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShutDown)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
