//! Connection lifecycle pieces: state, heartbeat timer, reconnect backoff.

pub mod backoff;
pub mod heartbeat;
pub mod state;

pub use backoff::Backoff;
pub use heartbeat::Heartbeat;
pub use state::ConnectionState;
