//! One socket connection, from open to close.
//!
//! A session runs on a single task: it selects over the shutdown token, the
//! heartbeat timer and inbound frames, so timer ticks, frame handling and
//! teardown never race each other.

use std::fmt::Display;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::connection::heartbeat::{Heartbeat, next_beat, resolve_interval};
use crate::connection::state::ConnectionState;
use crate::error::StreamError;
use crate::message::serializer::{deserialize_inbound, serialize_outbound};
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::snapshot::PresenceSnapshot;
use crate::subscription::Subscription;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The caller shut down. Do not reconnect.
    Shutdown,
    /// The connection was lost. Reconnect.
    Disconnected {
        /// How long the connection stayed up after the first Hello, or
        /// `None` if it never subscribed.
        subscribed_for: Option<Duration>,
        /// What ended it.
        error: StreamError,
    },
}

/// Drives the protocol over one open connection.
#[derive(Debug)]
pub struct StreamSession<'a> {
    subscription: &'a Subscription,
    default_heartbeat: Duration,
    snapshot: &'a watch::Sender<PresenceSnapshot>,
    state: &'a watch::Sender<ConnectionState>,
}

impl<'a> StreamSession<'a> {
    /// Creates a session that publishes into the given channels.
    pub fn new(
        subscription: &'a Subscription,
        default_heartbeat: Duration,
        snapshot: &'a watch::Sender<PresenceSnapshot>,
        state: &'a watch::Sender<ConnectionState>,
    ) -> Self {
        Self {
            subscription,
            default_heartbeat,
            snapshot,
            state,
        }
    }

    /// Runs until the connection ends or `shutdown` fires.
    ///
    /// On shutdown the heartbeat is stopped, the read side is no longer
    /// polled and a close frame is sent, in that order.
    pub async fn run<Si, St, E>(
        self,
        mut sink: Si,
        mut stream: St,
        shutdown: &CancellationToken,
    ) -> SessionEnd
    where
        Si: Sink<Message> + Unpin,
        Si::Error: Display,
        St: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        self.state.send_replace(ConnectionState::AwaitingHello);
        let mut heartbeat: Option<Heartbeat> = None;
        let mut subscribed_at: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    drop(heartbeat.take());
                    drop(stream);
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        debug!(error = %e, "Close frame not delivered");
                    }
                    return SessionEnd::Shutdown;
                }

                _ = next_beat(&mut heartbeat) => {
                    trace!("Sending heartbeat");
                    if let Err(error) = send(&mut sink, &OutboundMessage::Heartbeat).await {
                        return SessionEnd::Disconnected {
                            subscribed_for: subscribed_at.map(|t| t.elapsed()),
                            error,
                        };
                    }
                }

                frame = stream.next() => {
                    let error = match frame {
                        Some(Ok(Message::Text(text))) => {
                            match self.on_text(text.as_str(), &mut heartbeat, &mut sink).await {
                                Ok(hello) => {
                                    if hello && subscribed_at.is_none() {
                                        subscribed_at = Some(Instant::now());
                                    }
                                    continue;
                                }
                                Err(error) => error,
                            }
                        }
                        Some(Ok(Message::Close(frame))) => StreamError::Closed {
                            code: frame.as_ref().map(|f| u16::from(f.code)),
                            reason: frame.map(|f| f.reason.as_str().to_string()).unwrap_or_default(),
                        },
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => StreamError::Transport(e.to_string()),
                        None => StreamError::Closed {
                            code: None,
                            reason: "stream ended".to_string(),
                        },
                    };
                    return SessionEnd::Disconnected {
                        subscribed_for: subscribed_at.map(|t| t.elapsed()),
                        error,
                    };
                }
            }
        }
    }

    /// Handles one text frame. Returns `true` when it was a Hello.
    async fn on_text<Si>(
        &self,
        text: &str,
        heartbeat: &mut Option<Heartbeat>,
        sink: &mut Si,
    ) -> Result<bool, StreamError>
    where
        Si: Sink<Message> + Unpin,
        Si::Error: Display,
    {
        let message = match deserialize_inbound(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed frame");
                return Ok(false);
            }
        };

        match message {
            InboundMessage::Hello { heartbeat_interval } => {
                let period = resolve_interval(heartbeat_interval, self.default_heartbeat);
                *heartbeat = Some(Heartbeat::start(period));
                send(sink, &OutboundMessage::Initialize(self.subscription.clone())).await?;
                self.state.send_replace(ConnectionState::Heartbeating);
                info!(
                    subscription = %self.subscription,
                    heartbeat_ms = period.as_millis() as u64,
                    "Subscribed"
                );
                Ok(true)
            }
            InboundMessage::Event { kind, data: Some(data) } => {
                match PresenceSnapshot::decode(self.subscription, &kind, data) {
                    Ok(Some(update)) => {
                        self.snapshot.send_modify(|snapshot| snapshot.apply(update));
                    }
                    Ok(None) => debug!(?kind, "Ignoring event"),
                    Err(e) => warn!(?kind, error = %e, "Ignoring event with unreadable payload"),
                }
                Ok(false)
            }
            InboundMessage::Event { kind, data: None } => {
                debug!(?kind, "Ignoring event without payload");
                Ok(false)
            }
            InboundMessage::Unexpected { op } => {
                debug!(op, "Ignoring frame with unexpected opcode");
                Ok(false)
            }
        }
    }
}

async fn send<Si>(sink: &mut Si, message: &OutboundMessage) -> Result<(), StreamError>
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    let text = serialize_outbound(message).map_err(|e| StreamError::Encode(e.to_string()))?;
    sink.send(Message::text(text))
        .await
        .map_err(|e| StreamError::Transport(e.to_string()))
}
