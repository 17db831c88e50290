//! Discord snowflake identifier used as the subscription key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A Discord user identifier: a non-empty string of ASCII digits.
///
/// Snowflakes are 64-bit integers on the wire but Lanyard always sends them
/// as strings, so they are kept as strings here to avoid precision loss in
/// downstream JSON consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Snowflake(String);

impl Snowflake {
    /// Parse and validate a snowflake.
    pub fn parse(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::validation("Snowflake must not be empty"));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::validation(format!(
                "Snowflake must contain only digits, got '{value}'"
            )));
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Snowflake {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Snowflake {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for Snowflake {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Snowflake> for String {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl AsRef<str> for Snowflake {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
