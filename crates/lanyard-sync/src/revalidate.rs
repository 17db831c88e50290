//! Per-key revalidation with an in-flight guard.
//!
//! At most one revalidation per key runs at a time. A call that finds the
//! key already loading returns [`RevalidateOutcome::Skipped`] without
//! touching the network. Every path out of a revalidation that claimed the
//! key, including dropping its future, leaves `is_loading == false`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use lanyard_core::error::{AppError, FetchFailure};
use lanyard_core::traits::PresenceFetcher;
use lanyard_core::types::{Options, Snowflake};

use crate::state::SyncState;
use crate::store::SubscriptionStore;

/// How a single [`Revalidator::revalidate`] call ended.
#[derive(Debug, Clone)]
pub enum RevalidateOutcome {
    /// Another revalidation for the key was already in flight.
    Skipped,
    /// Fresh data was stored.
    Loaded,
    /// The server returned an error; the error was stored.
    Errored,
    /// The request never produced a usable response. Data and error were
    /// left as they were.
    TransportFailed(AppError),
    /// The caller cancelled before the response arrived.
    Cancelled,
}

/// Drives fetches for one key and writes the results into the store.
#[derive(Debug, Clone)]
pub struct Revalidator {
    store: Arc<SubscriptionStore>,
    fetcher: Arc<dyn PresenceFetcher>,
    key: Snowflake,
    options: Options,
}

impl Revalidator {
    /// Creates a revalidator for `key`.
    pub fn new(
        store: Arc<SubscriptionStore>,
        fetcher: Arc<dyn PresenceFetcher>,
        key: Snowflake,
        options: Options,
    ) -> Self {
        Self {
            store,
            fetcher,
            key,
            options,
        }
    }

    /// The key this revalidator refreshes.
    pub fn key(&self) -> &Snowflake {
        &self.key
    }

    /// Current state, seeded from the options on first access.
    pub fn state(&self) -> SyncState {
        self.store.get(&self.key, self.options.initial_data.as_ref())
    }

    /// Refreshes the key with no way to cancel other than dropping the
    /// returned future.
    pub async fn revalidate(&self) -> RevalidateOutcome {
        self.revalidate_with(&CancellationToken::new()).await
    }

    /// Refreshes the key, giving up when `cancel` fires.
    #[instrument(skip(self, cancel), fields(user_id = %self.key))]
    pub async fn revalidate_with(&self, cancel: &CancellationToken) -> RevalidateOutcome {
        let seed = self.options.initial_data.as_ref();
        if self.store.try_begin_loading(&self.key, seed).is_none() {
            return RevalidateOutcome::Skipped;
        }

        let guard = LoadingGuard::new(self.store.clone(), self.key.clone());
        let result = self
            .fetcher
            .fetch(&self.key, &self.options.api, cancel)
            .await;
        guard.disarm();

        match result {
            Ok(presence) => {
                self.store.update(&self.key, |s| s.loaded(presence));
                debug!("Presence loaded");
                RevalidateOutcome::Loaded
            }
            Err(FetchFailure::Server(error)) => {
                warn!(code = error.code, server_code = %error.server_code(), "Presence fetch rejected");
                self.store.update(&self.key, |s| s.errored(error));
                RevalidateOutcome::Errored
            }
            Err(FetchFailure::Cancelled) => {
                self.store.update(&self.key, |s| s.with_loading(false));
                debug!("Revalidation cancelled");
                RevalidateOutcome::Cancelled
            }
            Err(failure) => {
                self.store.update(&self.key, |s| s.with_loading(false));
                let error = AppError::from(failure);
                warn!(error = %error, "Presence fetch failed");
                RevalidateOutcome::TransportFailed(error)
            }
        }
    }
}

/// Clears `is_loading` for a key unless disarmed first.
///
/// Covers the revalidation future being dropped while the fetch is pending.
struct LoadingGuard {
    store: Arc<SubscriptionStore>,
    key: Snowflake,
    armed: bool,
}

impl LoadingGuard {
    fn new(store: Arc<SubscriptionStore>, key: Snowflake) -> Self {
        Self {
            store,
            key,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.armed {
            debug!(user_id = %self.key, "Revalidation dropped mid-flight");
            self.store.update(&self.key, |s| s.with_loading(false));
        }
    }
}
