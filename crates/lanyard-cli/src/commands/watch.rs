//! Socket streaming of one or more users.

use clap::Args;

use lanyard_core::config::AppConfig;
use lanyard_core::error::AppError;
use lanyard_core::types::Snowflake;
use lanyard_realtime::{Subscription, use_presence_stream};

use crate::output::{self, OutputFormat};

/// Arguments for `lanyard watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Discord user IDs; more than one subscribes to a list
    #[arg(required = true, num_args = 1..)]
    pub user_ids: Vec<String>,
}

/// Stream presences and print every snapshot until Ctrl-C
pub async fn execute(config: &AppConfig, args: &WatchArgs, format: OutputFormat) -> Result<(), AppError> {
    let subscription = subscription(&args.user_ids)?;
    let mut stream = use_presence_stream(subscription, &super::options(config), &config.realtime)?;
    let mut states = stream.connection_states();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = stream.changed() => {
                changed?;
                let snapshot = stream.snapshot();
                output::print_presences(snapshot.iter().map(|(_, p)| p), format);
            }
            Ok(()) = states.changed() => {
                let state = *states.borrow_and_update();
                tracing::info!(state = %state, "Connection state changed");
            }
        }
    }

    stream.shutdown().await;
    output::print_success("Stream closed");
    Ok(())
}

/// A single id subscribes to one user; several subscribe to a list.
fn subscription(raw: &[String]) -> Result<Subscription, AppError> {
    let mut ids = raw
        .iter()
        .map(|s| super::parse_id(s))
        .collect::<Result<Vec<Snowflake>, _>>()?;
    match ids.len() {
        0 => Err(AppError::validation("At least one user ID is required")),
        1 => Ok(Subscription::Single(ids.remove(0))),
        _ => Ok(Subscription::Many(ids)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_shape_follows_id_count() {
        let one = subscription(&["1".to_string()]).unwrap();
        assert!(!one.is_many());

        let two = subscription(&["1".to_string(), "2".to_string()]).unwrap();
        assert!(two.is_many());
        assert_eq!(two.ids().len(), 2);
    }

    #[test]
    fn test_subscription_rejects_bad_ids() {
        assert!(subscription(&["abc".to_string()]).is_err());
        assert!(subscription(&[]).is_err());
    }
}
