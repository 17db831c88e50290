//! Socket frame types and JSON serialization.

pub mod serializer;
pub mod types;

pub use types::{EventKind, InboundMessage, OutboundMessage, SocketOpcode};
