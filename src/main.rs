//! Lanyard presence watcher.
//!
//! Loads configuration and keeps every user listed in `watch.user_ids`
//! synchronized, either over one socket subscription or by REST polling,
//! until Ctrl-C or SIGTERM.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use lanyard_core::config::AppConfig;
use lanyard_core::config::watch::WatchMode;
use lanyard_core::error::AppError;
use lanyard_core::result::AppResult;
use lanyard_core::types::{Options, Presence, Snowflake};
use lanyard_realtime::{Subscription, use_presence_stream};
use lanyard_sync::{PresenceHandle, RevalidateOutcome, SyncContext, SyncState};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Watcher error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `config/{env}.toml` overlay and
/// `LANYARD__*` variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("LANYARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting lanyard-presence v{}", env!("CARGO_PKG_VERSION"));

    let ids = config
        .watch
        .user_ids
        .iter()
        .map(|raw| Snowflake::parse(raw.as_str()))
        .collect::<AppResult<Vec<_>>>()?;
    if ids.is_empty() {
        return Err(AppError::configuration(
            "watch.user_ids is empty; nothing to synchronize",
        ));
    }

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        trigger.cancel();
    });

    let options = Options::with_api(config.api.clone());
    match config.watch.mode {
        WatchMode::Socket => watch_socket(&config, &options, ids, &shutdown).await?,
        WatchMode::Rest => poll_rest(&config, &options, ids, &shutdown).await?,
    }

    tracing::info!("lanyard-presence stopped");
    Ok(())
}

/// One id subscribes to that user; several subscribe to a list.
fn subscription_for(mut ids: Vec<Snowflake>) -> Subscription {
    if ids.len() == 1 {
        Subscription::Single(ids.remove(0))
    } else {
        Subscription::Many(ids)
    }
}

async fn watch_socket(
    config: &AppConfig,
    options: &Options,
    ids: Vec<Snowflake>,
    shutdown: &CancellationToken,
) -> AppResult<()> {
    let subscription = subscription_for(ids);
    tracing::info!(subscription = %subscription, url = %config.api.socket_url(), "Streaming presences");

    let mut stream = use_presence_stream(subscription, options, &config.realtime)?;
    let mut seen: HashMap<Snowflake, Presence> = HashMap::new();

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            changed = stream.changed() => {
                changed?;
                let snapshot = stream.snapshot();
                for (id, presence) in snapshot.iter() {
                    if seen.get(id) != Some(presence) {
                        log_presence(id, presence);
                        seen.insert(id.clone(), presence.clone());
                    }
                }
            }
        }
    }

    stream.shutdown().await;
    Ok(())
}

async fn poll_rest(
    config: &AppConfig,
    options: &Options,
    ids: Vec<Snowflake>,
    shutdown: &CancellationToken,
) -> AppResult<()> {
    let period = Duration::from_secs(config.watch.poll_interval_seconds);
    tracing::info!(users = ids.len(), interval_secs = period.as_secs(), "Polling presences");

    let ctx = SyncContext::http()?;

    // Store writes only signal the loop; states are read back per handle.
    let (tx, mut rx) = mpsc::channel::<()>(config.realtime.channel_buffer_size.max(1));
    let _listener = ctx.store().subscribe(move || {
        let _ = tx.try_send(());
    });

    let handles = ids
        .into_iter()
        .map(|id| ctx.use_presence(id, options.clone()))
        .collect::<AppResult<Vec<PresenceHandle>>>()?;

    let mut ticker = interval_at(Instant::now() + period, period);
    let mut seen: HashMap<Snowflake, SyncState> = HashMap::new();

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            Some(()) = rx.recv() => {
                for handle in &handles {
                    let state = handle.state();
                    if seen.get(handle.key()) != Some(&state) {
                        log_state(handle.key(), &state);
                        seen.insert(handle.key().clone(), state);
                    }
                }
            }
            _ = ticker.tick() => {
                let round = join_all(handles.iter().map(|h| h.revalidate()));
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    outcomes = round => {
                        for (handle, outcome) in handles.iter().zip(outcomes) {
                            if let RevalidateOutcome::TransportFailed(e) = outcome {
                                tracing::warn!(user_id = %handle.key(), error = %e, "Revalidation failed");
                            }
                        }
                    }
                }
            }
        }
    }

    drop(handles);
    ctx.shutdown();
    Ok(())
}

fn log_presence(id: &Snowflake, presence: &Presence) {
    let activity = presence.primary_activity().map(|a| a.name.as_str()).unwrap_or("-");
    tracing::info!(
        user_id = %id,
        name = presence.discord_user.name(),
        status = %presence.discord_status,
        activity,
        "Presence updated"
    );
}

fn log_state(id: &Snowflake, state: &SyncState) {
    if let Some(error) = state.error() {
        tracing::warn!(
            user_id = %id,
            code = error.code,
            server_code = error.server_code(),
            "Presence unavailable: {}",
            error.message()
        );
    } else if let (false, Some(presence)) = (state.is_loading, state.data()) {
        log_presence(id, presence);
    } else {
        tracing::debug!(user_id = %id, state = state.name(), loading = state.is_loading, "Sync state changed");
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
