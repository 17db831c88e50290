//! Lanyard REST API envelope types.
//!
//! Every response is `{success: true, data}` or
//! `{success: false, error: {message, code}}`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};

/// Structured error object sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code, e.g. `user_not_found`.
    pub code: String,
}

/// The full body of an errored API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErroredApiResponse {
    /// Always `false`.
    pub success: bool,
    /// The error object.
    pub error: ApiErrorBody,
}

impl ErroredApiResponse {
    /// Wrap an error object in an errored envelope.
    pub fn new(error: ApiErrorBody) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// A decoded API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// `success: true` with its payload.
    Success(T),
    /// `success: false` with the server's error body.
    Errored(ErroredApiResponse),
}

#[derive(Deserialize)]
struct RawResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<ApiErrorBody>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode a response body, using `success` as the discriminant.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawResponse<T> = serde_json::from_slice(body)?;

        match (raw.success, raw.data, raw.error) {
            (true, Some(data), _) => Ok(Self::Success(data)),
            (true, None, _) => Err(serde_json::Error::custom(
                "successful response is missing `data`",
            )),
            (false, _, Some(error)) => Ok(Self::Errored(ErroredApiResponse::new(error))),
            (false, _, None) => Err(serde_json::Error::custom(
                "errored response is missing `error`",
            )),
        }
    }
}
