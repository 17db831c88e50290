//! Keyed presence state store with change listeners.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, error};

use lanyard_core::types::{Presence, Snowflake};

use crate::state::SyncState;

/// Callback invoked after every state write.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Thread-safe map of user id → [`SyncState`].
///
/// Every write notifies all listeners registered at the time of the write.
/// Listeners run synchronously on the writing task, outside any map lock,
/// and a panicking listener never prevents the others from running.
pub struct SubscriptionStore {
    /// User ID → current state.
    states: DashMap<Snowflake, SyncState>,
    /// Registered listeners in registration order.
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl SubscriptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Returns the state for `key`, creating it from `seed` on first access.
    ///
    /// Later calls ignore `seed`: the first observer's seed wins.
    pub fn get(&self, key: &Snowflake, seed: Option<&Presence>) -> SyncState {
        self.states
            .entry(key.clone())
            .or_insert_with(|| SyncState::initial(seed.cloned()))
            .clone()
    }

    /// Returns the state for `key` without creating it.
    pub fn peek(&self, key: &Snowflake) -> Option<SyncState> {
        self.states.get(key).map(|entry| entry.value().clone())
    }

    /// Replaces the state for `key` and notifies listeners.
    pub fn set(&self, key: &Snowflake, state: SyncState) {
        self.states.insert(key.clone(), state);
        self.notify();
    }

    /// Applies `f` to the current state for `key` atomically, stores the
    /// result and notifies listeners.
    pub fn update<F>(&self, key: &Snowflake, f: F) -> SyncState
    where
        F: FnOnce(SyncState) -> SyncState,
    {
        let next = {
            let mut entry = self
                .states
                .entry(key.clone())
                .or_insert_with(|| SyncState::initial(None));
            let next = f(entry.value().clone());
            *entry.value_mut() = next.clone();
            next
        };
        self.notify();
        next
    }

    /// Marks `key` as loading if no other caller already has.
    ///
    /// Check and set happen under the same entry lock, so exactly one of any
    /// number of concurrent callers gets `Some`. The winner receives the
    /// state as it was before the flag was set.
    pub fn try_begin_loading(&self, key: &Snowflake, seed: Option<&Presence>) -> Option<SyncState> {
        let previous = {
            let mut entry = self
                .states
                .entry(key.clone())
                .or_insert_with(|| SyncState::initial(seed.cloned()));
            if entry.is_loading {
                None
            } else {
                let previous = entry.value().clone();
                entry.is_loading = true;
                Some(previous)
            }
        };

        if previous.is_some() {
            self.notify();
        } else {
            debug!(user_id = %key, "Revalidation already in flight");
        }
        previous
    }

    /// Drops the state for `key`. The next access starts from scratch.
    pub fn remove(&self, key: &Snowflake) -> Option<SyncState> {
        self.states.remove(key).map(|(_, state)| state)
    }

    /// Registers a listener. It stays registered until the returned guard
    /// is dropped.
    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> ListenerGuard
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        ListenerGuard {
            store: Arc::downgrade(self),
            id,
        }
    }

    /// Removes a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.write().retain(|(existing, _)| *existing != id);
    }

    /// Calls every listener registered right now, in registration order.
    pub fn notify(&self) {
        let snapshot: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                error!("Presence listener panicked; continuing with remaining listeners");
            }
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Number of tracked users.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no user is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for SubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionStore")
            .field("users", &self.states.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Unregisters its listener on drop.
#[derive(Debug)]
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    store: Weak<SubscriptionStore>,
    id: ListenerId,
}

impl ListenerGuard {
    /// The id of the guarded listener.
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}
