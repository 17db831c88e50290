//! Stream-only observer surface.

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use lanyard_core::config::realtime::RealtimeConfig;
use lanyard_core::error::AppError;
use lanyard_core::result::AppResult;
use lanyard_core::types::{Options, Presence, Snowflake};

use crate::client::StreamingClient;
use crate::connection::state::ConnectionState;
use crate::snapshot::PresenceSnapshot;
use crate::subscription::Subscription;

/// Starts streaming presence for `subscription`.
///
/// The client runs on the current Tokio runtime until the returned stream
/// is shut down or dropped. Until the first event arrives, readers see
/// `options.initial_data`.
///
/// Fails with `EnvironmentUnsupported` when called outside a runtime.
pub fn use_presence_stream(
    subscription: impl Into<Subscription>,
    options: &Options,
    config: &RealtimeConfig,
) -> AppResult<PresenceStream> {
    let runtime = Handle::try_current().map_err(|_| {
        AppError::environment_unsupported(
            "Presence streaming needs a Tokio runtime to drive the socket",
        )
    })?;

    let subscription = subscription.into();
    let client = StreamingClient::new(&options.api, subscription.clone(), config.clone());
    Ok(PresenceStream::spawn(
        &runtime,
        client,
        subscription,
        options.initial_data.clone(),
    ))
}

/// Live presence snapshot fed by a background [`StreamingClient`].
#[derive(Debug)]
pub struct PresenceStream {
    subscription: Subscription,
    initial_data: Option<Presence>,
    snapshots: watch::Receiver<PresenceSnapshot>,
    states: watch::Receiver<ConnectionState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PresenceStream {
    /// Runs `client` on `runtime` and observes it.
    pub fn spawn(
        runtime: &Handle,
        client: StreamingClient,
        subscription: Subscription,
        initial_data: Option<Presence>,
    ) -> Self {
        let snapshots = client.snapshots();
        let states = client.states();
        let shutdown = CancellationToken::new();
        let task = runtime.spawn(client.run(shutdown.clone()));

        Self {
            subscription,
            initial_data,
            snapshots,
            states,
            shutdown,
            task: Some(task),
        }
    }

    /// Latest presence of the first subscribed user, or the seed data.
    pub fn latest(&self) -> Option<Presence> {
        let first = self.subscription.ids().first()?;
        self.latest_for(first)
    }

    /// Latest presence of `id`, or the seed data if it belongs to `id`.
    ///
    /// For a single subscription the seed also answers for the subscribed
    /// id, even when the seed payload names another user.
    pub fn latest_for(&self, id: &Snowflake) -> Option<Presence> {
        if let Some(presence) = self.snapshots.borrow().get(id) {
            return Some(presence.clone());
        }
        self.initial_data
            .as_ref()
            .filter(|seed| {
                seed.user_id() == id || (!self.subscription.is_many() && self.subscription.contains(id))
            })
            .cloned()
    }

    /// Every known presence. Falls back to the seed data before the first
    /// event.
    pub fn snapshot(&self) -> PresenceSnapshot {
        let current = self.snapshots.borrow().clone();
        match &self.initial_data {
            Some(seed) if current.is_empty() => PresenceSnapshot::with(seed.clone()),
            _ => current,
        }
    }

    /// Waits until a new snapshot is published.
    ///
    /// Fails once the client has stopped for good.
    pub async fn changed(&mut self) -> AppResult<()> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| AppError::cancelled("Presence stream has shut down"))
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.states.borrow()
    }

    /// A receiver following connection state changes.
    pub fn connection_states(&self) -> watch::Receiver<ConnectionState> {
        self.states.clone()
    }

    /// Stops the client and waits for it to close its socket.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!(error = %e, "Streaming task ended abnormally");
            }
        }
    }
}

impl Drop for PresenceStream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use lanyard_core::ErrorKind;
    use lanyard_core::types::DiscordStatus;
    use lanyard_core::types::presence::DiscordUser;

    use super::*;

    fn seed(id: &str) -> Presence {
        Presence {
            spotify: None,
            kv: Default::default(),
            listening_to_spotify: false,
            discord_user: DiscordUser {
                id: Snowflake::parse(id).unwrap(),
                username: "seed".to_string(),
                public_flags: 0,
                global_name: None,
                display_name: None,
                discriminator: "0".to_string(),
                bot: false,
                avatar_decoration_data: None,
                avatar: None,
            },
            discord_status: DiscordStatus::Idle,
            activities: Vec::new(),
            active_on_discord_web: false,
            active_on_discord_mobile: false,
            active_on_discord_desktop: false,
        }
    }

    #[test]
    fn test_outside_runtime_is_unsupported() {
        let id = Snowflake::parse("1").unwrap();
        let err = use_presence_stream(id, &Options::default(), &RealtimeConfig::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EnvironmentUnsupported);
    }

    #[tokio::test]
    async fn test_seed_is_visible_before_first_event() {
        let id = Snowflake::parse("1").unwrap();
        let client = StreamingClient::with_url(
            "ws://127.0.0.1:1/socket",
            Subscription::Single(id.clone()),
            RealtimeConfig::default(),
        );
        let stream = PresenceStream::spawn(
            &Handle::current(),
            client,
            Subscription::Single(id.clone()),
            Some(seed("1")),
        );

        assert_eq!(stream.latest().map(|p| p.discord_user.username), Some("seed".to_string()));
        assert_eq!(stream.snapshot().len(), 1);
        assert!(stream.latest_for(&id).is_some());
        assert!(stream.latest_for(&Snowflake::parse("2").unwrap()).is_none());

        stream.shutdown().await;
    }

    #[tokio::test]
    async fn test_seed_only_answers_for_its_user_in_list_subscriptions() {
        let ids = vec![Snowflake::parse("1").unwrap(), Snowflake::parse("2").unwrap()];
        let client = StreamingClient::with_url(
            "ws://127.0.0.1:1/socket",
            Subscription::Many(ids.clone()),
            RealtimeConfig::default(),
        );
        let stream = PresenceStream::spawn(
            &Handle::current(),
            client,
            Subscription::Many(ids.clone()),
            Some(seed("1")),
        );

        assert!(stream.latest_for(&ids[0]).is_some());
        assert!(stream.latest_for(&ids[1]).is_none());

        let states = stream.connection_states();
        stream.shutdown().await;
        assert_eq!(*states.borrow(), ConnectionState::ShutDown);
    }
}
