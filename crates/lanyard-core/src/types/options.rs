//! Observer-supplied options.

use serde::{Deserialize, Serialize};

use super::presence::Presence;
use crate::config::api::ApiConfig;

/// Options an observer passes when subscribing to a presence.
///
/// Unset fields fall back to the defaults: `api.lanyard.rest` over TLS and
/// no seed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Where the Lanyard API lives.
    #[serde(default)]
    pub api: ApiConfig,
    /// Seed data, e.g. a payload rendered ahead of time. Shown while no
    /// fetch has completed yet.
    #[serde(default)]
    pub initial_data: Option<Presence>,
}

impl Options {
    /// Options pointing at a specific API.
    pub fn with_api(api: ApiConfig) -> Self {
        Self {
            api,
            initial_data: None,
        }
    }

    /// Override the API hostname.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.api.hostname = hostname.into();
        self
    }

    /// Choose between TLS (`https`/`wss`) and plaintext (`http`/`ws`).
    pub fn secure(mut self, secure: bool) -> Self {
        self.api.secure = secure;
        self
    }

    /// Provide seed data.
    pub fn initial_data(mut self, data: Presence) -> Self {
        self.initial_data = Some(data);
        self
    }
}
