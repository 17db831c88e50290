//! Observer-facing handle returned by [`SyncContext::use_presence`].
//!
//! [`SyncContext::use_presence`]: crate::context::SyncContext::use_presence

use std::sync::Arc;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use lanyard_core::types::Snowflake;

use crate::revalidate::{RevalidateOutcome, Revalidator};
use crate::state::SyncState;
use crate::store::{ListenerGuard, SubscriptionStore};

/// A live view of one user's presence.
///
/// Dropping the handle cancels any revalidation it started. The state
/// itself stays in the store for other observers.
#[derive(Debug)]
pub struct PresenceHandle {
    revalidator: Revalidator,
    store: Arc<SubscriptionStore>,
    changes: Arc<Notify>,
    _changes_listener: ListenerGuard,
    cancel: CancellationToken,
}

impl PresenceHandle {
    pub(crate) fn new(
        revalidator: Revalidator,
        store: Arc<SubscriptionStore>,
        cancel: CancellationToken,
    ) -> Self {
        let changes = Arc::new(Notify::new());
        let notify = changes.clone();
        let listener = store.subscribe(move || notify.notify_one());

        Self {
            revalidator,
            store,
            changes,
            _changes_listener: listener,
            cancel,
        }
    }

    /// The observed key.
    pub fn key(&self) -> &Snowflake {
        self.revalidator.key()
    }

    /// Latest state.
    pub fn state(&self) -> SyncState {
        self.revalidator.state()
    }

    /// Refreshes the key now. Skipped if a refresh is already in flight.
    pub async fn revalidate(&self) -> RevalidateOutcome {
        self.revalidator.revalidate_with(&self.cancel).await
    }

    /// Registers a callback invoked after every store write. The callback
    /// should re-read [`state`](Self::state).
    pub fn listen<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Waits for the next store write.
    ///
    /// A write that happened since the previous call completes this
    /// immediately.
    pub async fn changed(&self) {
        self.changes.notified().await;
    }
}

impl Drop for PresenceHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
