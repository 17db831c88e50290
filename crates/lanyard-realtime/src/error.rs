//! Streaming errors.

use std::time::Duration;

use thiserror::Error;

use lanyard_core::error::{AppError, ErrorKind};

/// Why a socket connection ended or could not be opened.
///
/// None of these stop the streaming client; they are logged and followed by
/// a reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The WebSocket handshake failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The handshake did not finish in time.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Reading or writing the socket failed.
    #[error("socket error: {0}")]
    Transport(String),

    /// The server closed the connection.
    #[error("closed by server (code {code:?}): {reason}")]
    Closed {
        /// Close code, if the server sent a close frame.
        code: Option<u16>,
        /// Close reason, possibly empty.
        reason: String,
    },

    /// An outbound frame could not be encoded.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl From<StreamError> for AppError {
    fn from(err: StreamError) -> Self {
        let kind = match &err {
            StreamError::Encode(_) => ErrorKind::Serialization,
            _ => ErrorKind::Transport,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
