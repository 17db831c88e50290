//! Explicit synchronization context.
//!
//! A [`SyncContext`] owns one store and one fetcher. Everything that
//! observes or refreshes presences gets them from a context, so two
//! contexts (e.g. two tests) never share state.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lanyard_core::error::AppError;
use lanyard_core::result::AppResult;
use lanyard_core::traits::PresenceFetcher;
use lanyard_core::types::{Options, Snowflake};

use crate::fetcher::HttpPresenceFetcher;
use crate::handle::PresenceHandle;
use crate::revalidate::Revalidator;
use crate::store::SubscriptionStore;

/// Shared store, fetcher and shutdown signal.
#[derive(Debug, Clone)]
pub struct SyncContext {
    store: Arc<SubscriptionStore>,
    fetcher: Arc<dyn PresenceFetcher>,
    shutdown: CancellationToken,
}

impl SyncContext {
    /// Creates a context around an arbitrary fetcher.
    pub fn new(fetcher: Arc<dyn PresenceFetcher>) -> Self {
        Self {
            store: Arc::new(SubscriptionStore::new()),
            fetcher,
            shutdown: CancellationToken::new(),
        }
    }

    /// Creates a context that fetches over HTTP.
    pub fn http() -> AppResult<Self> {
        Ok(Self::new(Arc::new(HttpPresenceFetcher::new()?)))
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<SubscriptionStore> {
        &self.store
    }

    /// A revalidator for `key` bound to this context.
    pub fn revalidator(&self, key: Snowflake, options: Options) -> Revalidator {
        Revalidator::new(self.store.clone(), self.fetcher.clone(), key, options)
    }

    /// Starts observing `key`.
    ///
    /// Seeds the key from `options.initial_data` if nobody has yet, then
    /// spawns one revalidation on the current Tokio runtime. The returned
    /// handle cancels that revalidation when dropped.
    ///
    /// Fails with `EnvironmentUnsupported` when called outside a runtime.
    pub fn use_presence(&self, key: Snowflake, options: Options) -> AppResult<PresenceHandle> {
        let runtime = Handle::try_current().map_err(|_| {
            AppError::environment_unsupported(
                "Presence synchronization needs a Tokio runtime to schedule fetches",
            )
        })?;

        let revalidator = self.revalidator(key, options);
        revalidator.state();

        let cancel = self.shutdown.child_token();
        let initial = revalidator.clone();
        let token = cancel.clone();
        runtime.spawn(async move {
            let outcome = initial.revalidate_with(&token).await;
            debug!(user_id = %initial.key(), ?outcome, "Initial revalidation finished");
        });

        Ok(PresenceHandle::new(revalidator, self.store.clone(), cancel))
    }

    /// Cancels every in-flight revalidation started through
    /// [`use_presence`](Self::use_presence).
    pub fn shutdown(&self) {
        info!("Shutting down presence synchronization");
        self.shutdown.cancel();
    }
}
