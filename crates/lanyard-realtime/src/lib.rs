//! # lanyard-realtime
//!
//! Live presence over the Lanyard socket. Provides:
//!
//! - The four-opcode socket protocol (Event, Hello, Initialize, Heartbeat)
//! - Server-driven heartbeat with a safe fallback interval
//! - Reconnect with bounded exponential backoff
//! - Single-user and multi-user snapshots published over watch channels
//! - [`stream::use_presence_stream`], the stream-only observer surface

pub mod client;
pub mod connection;
pub mod error;
pub mod message;
pub mod session;
pub mod snapshot;
pub mod stream;
pub mod subscription;

pub use client::StreamingClient;
pub use connection::state::ConnectionState;
pub use error::StreamError;
pub use snapshot::PresenceSnapshot;
pub use stream::{PresenceStream, use_presence_stream};
pub use subscription::Subscription;
