//! # lanyard-sync
//!
//! Keeps a local, keyed view of Lanyard presences up to date over REST.
//!
//! - [`store::SubscriptionStore`] holds one [`state::SyncState`] per user and
//!   notifies registered listeners on every write
//! - [`fetcher::HttpPresenceFetcher`] performs a single cancellable request
//! - [`revalidate::Revalidator`] runs at most one refresh per user at a time
//!   and writes its results into the store
//! - [`context::SyncContext`] ties them together and hands out
//!   [`handle::PresenceHandle`]s to observers

pub mod context;
pub mod fetcher;
pub mod handle;
pub mod revalidate;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use context::SyncContext;
pub use fetcher::HttpPresenceFetcher;
pub use handle::PresenceHandle;
pub use revalidate::{RevalidateOutcome, Revalidator};
pub use state::{Phase, SyncState};
pub use store::{Listener, ListenerGuard, ListenerId, SubscriptionStore};
