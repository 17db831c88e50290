//! Unified error types for Lanyard.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. Fetch results keep their own
//! richer type, [`FetchFailure`], so that a server-returned error body is
//! never confused with a transport failure or a cancellation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::response::ErroredApiResponse;

/// Top-level error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The network was unreachable, timed out, or the connection dropped.
    Transport,
    /// The operation was cancelled by its caller.
    Cancelled,
    /// The remote server answered with a well-formed error body.
    Server,
    /// A frame or body did not follow the expected wire format.
    Protocol,
    /// The host cannot provide what the operation needs (e.g. no runtime).
    EnvironmentUnsupported,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// Input validation failed.
    Validation,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Server => write!(f, "SERVER"),
            Self::Protocol => write!(f, "PROTOCOL"),
            Self::EnvironmentUnsupported => write!(f, "ENVIRONMENT_UNSUPPORTED"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Lanyard.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    /// Create an environment-unsupported error.
    pub fn environment_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EnvironmentUnsupported, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Transport, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Validation,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}

/// The outbound request a [`FetchError`] belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: String,
    /// Fully qualified request URL.
    pub url: String,
}

/// A well-formed error returned by the Lanyard API.
///
/// `code` is the HTTP status of the response; the server's own
/// machine-readable code lives in `body.error.code`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{} (HTTP {code})", .body.error.message)]
pub struct FetchError {
    /// The request that produced this error.
    pub request: RequestDescriptor,
    /// HTTP status code of the response.
    pub code: u16,
    /// Structured error body sent by the server.
    pub body: ErroredApiResponse,
}

impl FetchError {
    /// Server-supplied human-readable message.
    pub fn message(&self) -> &str {
        &self.body.error.message
    }

    /// Server-supplied machine-readable code, e.g. `user_not_found`.
    pub fn server_code(&self) -> &str {
        &self.body.error.code
    }
}

/// Every way a single presence fetch can fail.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The server answered with an error body.
    #[error(transparent)]
    Server(#[from] FetchError),

    /// The request never produced a usable response.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
        /// Underlying client error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The response body was not a valid API envelope.
    #[error("malformed response (HTTP {status}): {source}")]
    Malformed {
        /// HTTP status code of the response.
        status: u16,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The caller's cancellation token fired before the response arrived.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchFailure {
    /// Create a transport failure with an underlying cause.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this failure was a cancellation rather than an error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<FetchFailure> for AppError {
    fn from(err: FetchFailure) -> Self {
        match err {
            FetchFailure::Server(e) => AppError::with_source(ErrorKind::Server, e.to_string(), e),
            FetchFailure::Transport { message, source } => AppError {
                kind: ErrorKind::Transport,
                message,
                source,
            },
            FetchFailure::Malformed { status, source } => AppError {
                source: Some(Box::new(source)),
                ..AppError::protocol(format!("Malformed response with HTTP status {status}"))
            },
            FetchFailure::Cancelled => AppError::cancelled("Request cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::response::ApiErrorBody;

    fn not_found() -> FetchError {
        FetchError {
            request: RequestDescriptor {
                method: "GET".to_string(),
                url: "https://api.lanyard.rest/v1/users/123".to_string(),
            },
            code: 404,
            body: ErroredApiResponse::new(ApiErrorBody {
                message: "User not found".to_string(),
                code: "user_not_found".to_string(),
            }),
        }
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(not_found().to_string(), "User not found (HTTP 404)");
        assert_eq!(not_found().server_code(), "user_not_found");
    }

    #[test]
    fn test_fetch_failure_maps_to_kind() {
        let server: AppError = FetchFailure::from(not_found()).into();
        assert_eq!(server.kind, ErrorKind::Server);

        let cancelled: AppError = FetchFailure::Cancelled.into();
        assert_eq!(cancelled.kind, ErrorKind::Cancelled);

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let transport: AppError = FetchFailure::transport("timed out", io).into();
        assert_eq!(transport.kind, ErrorKind::Transport);
    }

    #[test]
    fn test_malformed_response_is_a_protocol_error() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: AppError = FetchFailure::Malformed { status: 502, source }.into();
        assert_eq!(err.kind, ErrorKind::Protocol);
        assert_eq!(err.message, "Malformed response with HTTP status 502");
        assert!(err.source.is_some());
    }

    #[test]
    fn test_app_error_clone_drops_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = AppError::with_source(ErrorKind::Internal, "boom", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Internal);
        assert!(cloned.source.is_none());
    }
}
