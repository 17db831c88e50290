//! Periodic REST revalidation of one user.

use std::time::Duration;

use clap::Args;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};

use lanyard_core::config::AppConfig;
use lanyard_core::error::AppError;
use lanyard_sync::{RevalidateOutcome, SyncContext, SyncState};

use crate::output::{self, OutputFormat};

/// Arguments for `lanyard poll`
#[derive(Debug, Args)]
pub struct PollArgs {
    /// Discord user ID
    pub user_id: String,

    /// Seconds between revalidations; defaults to `watch.poll_interval_seconds`
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many revalidations
    #[arg(short = 'n', long)]
    pub count: Option<u64>,
}

/// Revalidate on an interval and print every state change until Ctrl-C
pub async fn execute(config: &AppConfig, args: &PollArgs, format: OutputFormat) -> Result<(), AppError> {
    let id = super::parse_id(&args.user_id)?;
    let seconds = args.interval.unwrap_or(config.watch.poll_interval_seconds).max(1);
    let period = Duration::from_secs(seconds);

    let ctx = SyncContext::http()?;

    // Listeners run inside store writes; hand states off to the loop.
    let (tx, mut rx) = mpsc::channel(config.realtime.channel_buffer_size.max(1));
    let store = ctx.store().clone();
    let key = id.clone();
    let _listener = ctx.store().subscribe(move || {
        if let Some(state) = store.peek(&key) {
            let _ = tx.try_send(state);
        }
    });
    let handle = ctx.use_presence(id, super::options(config))?;

    let mut ticker = interval_at(Instant::now() + period, period);
    let mut last: Option<SyncState> = None;
    let mut rounds = 0u64;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(state) = rx.recv() => {
                if last.as_ref() != Some(&state) {
                    print_state(&state, format);
                    last = Some(state);
                }
            }
            _ = ticker.tick() => {
                if args.count.is_some_and(|n| rounds >= n) {
                    break;
                }
                rounds += 1;
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    outcome = handle.revalidate() => {
                        if let RevalidateOutcome::TransportFailed(e) = outcome {
                            output::print_warning(&format!("Revalidation failed: {}", e));
                        }
                    }
                }
            }
        }
    }

    drop(handle);
    ctx.shutdown();
    Ok(())
}

fn print_state(state: &SyncState, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(state) {
            Ok(line) => println!("{}", line),
            Err(e) => output::print_error(&format!("Failed to encode state: {}", e)),
        },
        OutputFormat::Table => println!("{}", describe(state)),
    }
}

/// One-line summary of a sync state
fn describe(state: &SyncState) -> String {
    let mut line = state.name().to_string();
    if state.is_loading {
        line.push_str(" (loading)");
    }
    if let Some(p) = state.data() {
        line.push_str(&format!(" {} is {}", p.discord_user.name(), p.discord_status));
    }
    if let Some(e) = state.error() {
        line.push_str(&format!(" [{} {}: {}]", e.code, e.server_code(), e.message()));
    }
    line
}
