//! Per-user synchronization state.

use serde::Serialize;

use lanyard_core::error::FetchError;
use lanyard_core::types::presence::Presence;

/// What is known about a user's presence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    /// No fetch has succeeded yet. May carry seed data supplied by the
    /// observer.
    Initial {
        /// Seed data, if any.
        data: Option<Presence>,
    },
    /// The most recent fetch succeeded.
    Loaded {
        /// The latest presence.
        data: Presence,
    },
    /// The most recent fetch failed with a server error.
    Errored {
        /// Last known good presence, if one was ever loaded or seeded.
        data: Option<Presence>,
        /// The server error.
        error: FetchError,
    },
}

/// A [`Phase`] plus the in-flight flag.
///
/// `is_loading` is independent of the phase and is only `true` while a
/// revalidation for the key owns the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncState {
    /// Data phase.
    #[serde(flatten)]
    pub phase: Phase,
    /// Whether a fetch for this key is in flight.
    pub is_loading: bool,
}

impl SyncState {
    /// Fresh state for a key nobody has fetched yet.
    pub fn initial(seed: Option<Presence>) -> Self {
        Self {
            phase: Phase::Initial { data: seed },
            is_loading: false,
        }
    }

    /// Short name of the phase: `initial`, `loaded` or `errored`.
    pub fn name(&self) -> &'static str {
        match self.phase {
            Phase::Initial { .. } => "initial",
            Phase::Loaded { .. } => "loaded",
            Phase::Errored { .. } => "errored",
        }
    }

    /// Best data available, regardless of phase.
    pub fn data(&self) -> Option<&Presence> {
        match &self.phase {
            Phase::Initial { data } | Phase::Errored { data, .. } => data.as_ref(),
            Phase::Loaded { data } => Some(data),
        }
    }

    /// The error of the most recent fetch, if it failed.
    pub fn error(&self) -> Option<&FetchError> {
        match &self.phase {
            Phase::Errored { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Same phase, different loading flag.
    pub fn with_loading(self, is_loading: bool) -> Self {
        Self { is_loading, ..self }
    }

    /// Transition after a successful fetch. Clears any previous error.
    pub fn loaded(self, data: Presence) -> Self {
        Self {
            phase: Phase::Loaded { data },
            is_loading: false,
        }
    }

    /// Transition after a server error. Keeps the last known good data.
    pub fn errored(self, error: FetchError) -> Self {
        let data = match self.phase {
            Phase::Initial { data } | Phase::Errored { data, .. } => data,
            Phase::Loaded { data } => Some(data),
        };
        Self {
            phase: Phase::Errored { data, error },
            is_loading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{not_found, presence};

    #[test]
    fn test_initial_carries_seed() {
        let seed = presence("1");
        let state = SyncState::initial(Some(seed.clone()));
        assert_eq!(state.name(), "initial");
        assert_eq!(state.data(), Some(&seed));
        assert!(state.error().is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_errored_keeps_last_known_good() {
        let first = presence("1");
        let state = SyncState::initial(None)
            .with_loading(true)
            .loaded(first.clone())
            .with_loading(true)
            .errored(not_found("1"));

        assert_eq!(state.name(), "errored");
        assert_eq!(state.data(), Some(&first));
        assert_eq!(state.error().map(|e| e.code), Some(404));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_loaded_clears_error() {
        let state = SyncState::initial(None)
            .errored(not_found("1"))
            .loaded(presence("1"));
        assert_eq!(state.name(), "loaded");
        assert!(state.error().is_none());
    }

    #[test]
    fn test_serializes_with_state_tag() {
        let json = serde_json::to_value(SyncState::initial(None)).unwrap();
        assert_eq!(json["state"], "initial");
        assert_eq!(json["is_loading"], false);
        assert!(json["data"].is_null());
    }
}
