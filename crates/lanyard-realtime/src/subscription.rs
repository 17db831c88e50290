//! What a socket connection subscribes to.

use std::fmt;

use lanyard_core::types::Snowflake;

/// One user or a list of users.
///
/// The two shapes use different `Initialize` payloads and different
/// `INIT_STATE` bodies, but the same protocol otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// A single user (`subscribe_to_id`).
    Single(Snowflake),
    /// Several users (`subscribe_to_ids`).
    Many(Vec<Snowflake>),
}

impl Subscription {
    /// Every subscribed id, in request order.
    pub fn ids(&self) -> &[Snowflake] {
        match self {
            Self::Single(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }

    /// Whether `id` is part of this subscription.
    pub fn contains(&self, id: &Snowflake) -> bool {
        self.ids().contains(id)
    }

    /// Whether this is a list subscription.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl From<Snowflake> for Subscription {
    fn from(id: Snowflake) -> Self {
        Self::Single(id)
    }
}

impl From<Vec<Snowflake>> for Subscription {
    fn from(ids: Vec<Snowflake>) -> Self {
        Self::Many(ids)
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(id) => write!(f, "{id}"),
            Self::Many(ids) => {
                let joined: Vec<&str> = ids.iter().map(Snowflake::as_str).collect();
                write!(f, "[{}]", joined.join(","))
            }
        }
    }
}
