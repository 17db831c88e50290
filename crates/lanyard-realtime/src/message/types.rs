//! Inbound and outbound socket frame definitions.
//!
//! Every frame is a JSON object `{op, t?, d?}` where `op` selects one of
//! four opcodes.

use serde::Serialize;
use serde_json::Value;

use lanyard_core::types::Snowflake;

use crate::subscription::Subscription;

/// Frame opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketOpcode {
    /// Server → client: a dispatched event.
    Event = 0,
    /// Server → client: first frame after connect, carries the heartbeat
    /// interval.
    Hello = 1,
    /// Client → server: subscription request.
    Initialize = 2,
    /// Client → server: keepalive.
    Heartbeat = 3,
}

impl SocketOpcode {
    /// Maps a wire value to an opcode.
    pub fn from_u8(op: u8) -> Option<Self> {
        match op {
            0 => Some(Self::Event),
            1 => Some(Self::Hello),
            2 => Some(Self::Initialize),
            3 => Some(Self::Heartbeat),
            _ => None,
        }
    }

    /// Wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Event type carried in `t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Full state for the subscription, sent right after `Initialize`.
    InitState,
    /// One user's presence changed.
    PresenceUpdate,
    /// Any other event type. Ignored.
    Other(String),
}

impl EventKind {
    /// Parses the `t` field.
    pub fn parse(t: &str) -> Self {
        match t {
            "INIT_STATE" => Self::InitState,
            "PRESENCE_UPDATE" => Self::PresenceUpdate,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether events of this kind replace snapshot data.
    pub fn carries_presence(&self) -> bool {
        matches!(self, Self::InitState | Self::PresenceUpdate)
    }
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// `op: 1`. `heartbeat_interval` is `None` when absent or not a
    /// non-negative integer.
    Hello {
        /// Advertised heartbeat interval in milliseconds.
        heartbeat_interval: Option<u64>,
    },
    /// `op: 0`.
    Event {
        /// Event type.
        kind: EventKind,
        /// Raw payload, interpreted against the subscription.
        data: Option<Value>,
    },
    /// A client-only opcode or an unknown one arriving from the server.
    Unexpected {
        /// The raw opcode.
        op: u64,
    },
}

/// A frame the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// `op: 2` with the subscription target(s).
    Initialize(Subscription),
    /// `op: 3`, no payload.
    Heartbeat,
}

/// `d` of an `Initialize` frame.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum InitializePayload<'a> {
    Single { subscribe_to_id: &'a Snowflake },
    Many { subscribe_to_ids: &'a [Snowflake] },
}

/// Wire shape of an outbound frame.
#[derive(Debug, Serialize)]
pub(crate) struct OutboundFrame<'a> {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<InitializePayload<'a>>,
}

impl OutboundMessage {
    pub(crate) fn frame(&self) -> OutboundFrame<'_> {
        match self {
            Self::Initialize(subscription) => OutboundFrame {
                op: SocketOpcode::Initialize.as_u8(),
                d: Some(match subscription {
                    Subscription::Single(id) => InitializePayload::Single {
                        subscribe_to_id: id,
                    },
                    Subscription::Many(ids) => InitializePayload::Many {
                        subscribe_to_ids: ids,
                    },
                }),
            },
            Self::Heartbeat => OutboundFrame {
                op: SocketOpcode::Heartbeat.as_u8(),
                d: None,
            },
        }
    }
}
