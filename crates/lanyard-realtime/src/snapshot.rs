//! Locally held presence snapshot.
//!
//! Presences are never patched: an accepted event replaces an entry, or
//! the whole map, in full.

use std::collections::BTreeMap;

use serde_json::Value;

use lanyard_core::types::{Presence, Snowflake};

use crate::message::types::EventKind;
use crate::subscription::Subscription;

/// Latest presence per subscribed user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceSnapshot {
    entries: BTreeMap<Snowflake, Presence>,
}

/// A decoded, not yet applied, snapshot change.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotUpdate {
    /// Replace every entry.
    Replace(BTreeMap<Snowflake, Presence>),
    /// Replace one entry.
    Upsert(Snowflake, Presence),
}

impl PresenceSnapshot {
    /// A snapshot holding a single presence.
    pub fn with(presence: Presence) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(presence.user_id().clone(), presence);
        Self { entries }
    }

    /// Interprets an event payload against the subscription shape.
    ///
    /// - single subscription: `d` is the presence; it replaces the snapshot
    /// - list subscription, `INIT_STATE`: `d` maps id → presence
    /// - list subscription, `PRESENCE_UPDATE`: `d` is one presence plus
    ///   `user_id`; falls back to `discord_user.id`
    ///
    /// Returns `Ok(None)` for event kinds that carry no presence.
    pub fn decode(
        subscription: &Subscription,
        kind: &EventKind,
        data: Value,
    ) -> Result<Option<SnapshotUpdate>, serde_json::Error> {
        if !kind.carries_presence() {
            return Ok(None);
        }

        let update = match subscription {
            Subscription::Single(id) => {
                let presence: Presence = serde_json::from_value(data)?;
                let mut entries = BTreeMap::new();
                entries.insert(id.clone(), presence);
                SnapshotUpdate::Replace(entries)
            }
            Subscription::Many(_) if *kind == EventKind::InitState => {
                SnapshotUpdate::Replace(serde_json::from_value(data)?)
            }
            Subscription::Many(_) => {
                let user_id = data
                    .get("user_id")
                    .and_then(Value::as_str)
                    .and_then(|s| Snowflake::parse(s).ok());
                let presence: Presence = serde_json::from_value(data)?;
                let key = user_id.unwrap_or_else(|| presence.user_id().clone());
                SnapshotUpdate::Upsert(key, presence)
            }
        };
        Ok(Some(update))
    }

    /// Applies a decoded update.
    pub fn apply(&mut self, update: SnapshotUpdate) {
        match update {
            SnapshotUpdate::Replace(entries) => self.entries = entries,
            SnapshotUpdate::Upsert(id, presence) => {
                self.entries.insert(id, presence);
            }
        }
    }

    /// Presence of one user.
    pub fn get(&self, id: &Snowflake) -> Option<&Presence> {
        self.entries.get(id)
    }

    /// All entries ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&Snowflake, &Presence)> {
        self.entries.iter()
    }

    /// Number of users with a known presence.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no presence has arrived yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
