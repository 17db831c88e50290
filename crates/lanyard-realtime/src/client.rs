//! Reconnecting socket client.

use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lanyard_core::config::api::ApiConfig;
use lanyard_core::config::realtime::RealtimeConfig;

use crate::connection::backoff::Backoff;
use crate::connection::state::ConnectionState;
use crate::error::StreamError;
use crate::session::{SessionEnd, StreamSession};
use crate::snapshot::PresenceSnapshot;
use crate::subscription::Subscription;

/// Keeps one subscription alive across disconnects.
///
/// [`run`](Self::run) connects, runs a [`StreamSession`] and, when the
/// connection drops, waits out a backoff delay and connects again. Only the
/// shutdown token ends the loop.
#[derive(Debug)]
pub struct StreamingClient {
    url: String,
    subscription: Subscription,
    config: RealtimeConfig,
    snapshot: watch::Sender<PresenceSnapshot>,
    state: watch::Sender<ConnectionState>,
}

impl StreamingClient {
    /// Creates a client for `subscription` against the socket of `api`.
    pub fn new(api: &ApiConfig, subscription: Subscription, config: RealtimeConfig) -> Self {
        Self::with_url(api.socket_url(), subscription, config)
    }

    /// Creates a client for an explicit socket URL.
    pub fn with_url(url: impl Into<String>, subscription: Subscription, config: RealtimeConfig) -> Self {
        Self {
            url: url.into(),
            subscription,
            config,
            snapshot: watch::Sender::new(PresenceSnapshot::default()),
            state: watch::Sender::new(ConnectionState::Disconnected),
        }
    }

    /// The socket URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Receives every snapshot the client publishes.
    pub fn snapshots(&self) -> watch::Receiver<PresenceSnapshot> {
        self.snapshot.subscribe()
    }

    /// Receives every connection state change.
    pub fn states(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Connects and reconnects until `shutdown` fires.
    ///
    /// Shutdown is honoured while connecting, while waiting for Hello,
    /// while subscribed and while waiting to reconnect.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut backoff = Backoff::from_config(&self.config);

        loop {
            self.state.send_replace(ConnectionState::Connecting);

            let connect = tokio::time::timeout(
                self.config.connect_timeout(),
                tokio_tungstenite::connect_async(self.url.as_str()),
            );
            let connected = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = connect => result,
            };

            let error = match connected {
                Ok(Ok((socket, _response))) => {
                    info!(url = %self.url, "Socket connected");
                    let (sink, stream) = socket.split();
                    let session = StreamSession::new(
                        &self.subscription,
                        self.config.default_heartbeat(),
                        &self.snapshot,
                        &self.state,
                    );
                    match session.run(sink, stream, &shutdown).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Disconnected { subscribed_for, error } => {
                            if subscribed_for.is_some_and(|uptime| backoff.is_healthy(uptime)) {
                                backoff.reset();
                            }
                            error
                        }
                    }
                }
                Ok(Err(e)) => StreamError::Connect(e.to_string()),
                Err(_) => StreamError::ConnectTimeout(self.config.connect_timeout()),
            };

            self.state.send_replace(ConnectionState::Disconnected);
            let delay = backoff.next_delay();
            warn!(
                url = %self.url,
                error = %error,
                attempt = backoff.attempt(),
                delay_ms = delay.as_millis() as u64,
                "Socket disconnected, reconnecting"
            );

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.state.send_replace(ConnectionState::ShutDown);
        info!(url = %self.url, "Streaming client stopped");
    }
}
