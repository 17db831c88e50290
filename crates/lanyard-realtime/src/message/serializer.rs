//! JSON serialization for socket frames.

use serde::Deserialize;
use serde_json::Value;

use super::types::{EventKind, InboundMessage, OutboundMessage, SocketOpcode};

#[derive(Deserialize)]
struct RawFrame {
    op: u64,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    d: Option<Value>,
}

/// Serialize an outbound frame to JSON.
pub fn serialize_outbound(msg: &OutboundMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(&msg.frame())
}

/// Deserialize a server frame from JSON.
///
/// Fails only when the text is not a JSON object with an integer `op`.
pub fn deserialize_inbound(text: &str) -> Result<InboundMessage, serde_json::Error> {
    let raw: RawFrame = serde_json::from_str(text)?;

    let opcode = u8::try_from(raw.op).ok().and_then(SocketOpcode::from_u8);
    let message = match opcode {
        Some(SocketOpcode::Hello) => InboundMessage::Hello {
            heartbeat_interval: raw
                .d
                .as_ref()
                .and_then(|d| d.get("heartbeat_interval"))
                .and_then(Value::as_u64),
        },
        Some(SocketOpcode::Event) => InboundMessage::Event {
            kind: EventKind::parse(raw.t.as_deref().unwrap_or_default()),
            data: raw.d,
        },
        _ => InboundMessage::Unexpected { op: raw.op },
    };
    Ok(message)
}
