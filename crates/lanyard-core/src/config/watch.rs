//! Settings for the long-running presence watcher.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How the watcher keeps presences up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchMode {
    /// One persistent socket subscription.
    #[default]
    Socket,
    /// Periodic REST revalidation.
    Rest,
}

/// Which users the watcher follows and how.
#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Users to follow.
    #[serde(default)]
    pub user_ids: Vec<String>,
    /// Synchronization mode.
    #[serde(default)]
    pub mode: WatchMode,
    /// Seconds between revalidations in [`WatchMode::Rest`].
    #[serde(default = "default_poll_interval")]
    #[validate(range(min = 1, max = 86_400))]
    pub poll_interval_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            user_ids: Vec::new(),
            mode: WatchMode::default(),
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}
