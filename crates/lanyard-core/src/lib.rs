//! # lanyard-core
//!
//! Core crate for Lanyard presence synchronization. Contains the
//! configuration schemas, the presence data model, the API envelope types,
//! the [`traits::PresenceFetcher`] seam and the unified error system.
//!
//! This crate has **no** internal dependencies on other Lanyard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, FetchError, FetchFailure};
pub use result::AppResult;
pub use types::{Options, Presence, Snowflake};
