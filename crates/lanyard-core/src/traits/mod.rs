//! Core traits defined in `lanyard-core` and implemented by other crates.

pub mod fetcher;

pub use fetcher::PresenceFetcher;
