//! Shared fixtures for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use lanyard_core::config::api::ApiConfig;
use lanyard_core::error::{FetchError, FetchFailure, RequestDescriptor};
use lanyard_core::traits::PresenceFetcher;
use lanyard_core::types::presence::{DiscordStatus, DiscordUser, Presence};
use lanyard_core::types::response::{ApiErrorBody, ErroredApiResponse};
use lanyard_core::types::Snowflake;

pub fn presence(id: &str) -> Presence {
    presence_with_status(id, DiscordStatus::Online)
}

pub fn presence_with_status(id: &str, status: DiscordStatus) -> Presence {
    Presence {
        spotify: None,
        kv: HashMap::new(),
        listening_to_spotify: false,
        discord_user: DiscordUser {
            id: Snowflake::parse(id).unwrap(),
            username: format!("user{id}"),
            public_flags: 0,
            global_name: None,
            display_name: None,
            discriminator: "0".to_string(),
            bot: false,
            avatar_decoration_data: None,
            avatar: None,
        },
        discord_status: status,
        activities: Vec::new(),
        active_on_discord_web: false,
        active_on_discord_mobile: false,
        active_on_discord_desktop: true,
    }
}

pub fn not_found(id: &str) -> FetchError {
    FetchError {
        request: RequestDescriptor {
            method: "GET".to_string(),
            url: format!("https://api.lanyard.rest/v1/users/{id}"),
        },
        code: 404,
        body: ErroredApiResponse::new(ApiErrorBody {
            message: "User not found".to_string(),
            code: "user_not_found".to_string(),
        }),
    }
}

pub fn key(id: &str) -> Snowflake {
    Snowflake::parse(id).unwrap()
}

/// What the next call to [`ScriptedFetcher::fetch`] returns.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Presence),
    NotFound,
    Transport,
}

/// Fetcher that replays scripted replies after a fixed delay and counts calls.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    delay: Duration,
    replies: Mutex<VecDeque<Reply>>,
}

impl ScriptedFetcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PresenceFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        id: &Snowflake,
        _api: &ApiConfig,
        cancel: &CancellationToken,
    ) -> Result<Presence, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::select! {
            _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }

        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Reply::Ok(presence(id.as_str())));

        match reply {
            Reply::Ok(p) => Ok(p),
            Reply::NotFound => Err(FetchFailure::Server(not_found(id.as_str()))),
            Reply::Transport => Err(FetchFailure::Transport {
                message: "connection refused".to_string(),
                source: None,
            }),
        }
    }
}
