//! One-shot presence fetch.

use clap::Args;

use lanyard_core::config::AppConfig;
use lanyard_core::error::{AppError, FetchFailure};
use lanyard_sync::{Phase, RevalidateOutcome, SyncContext};

use crate::output::{self, OutputFormat};

/// Arguments for `lanyard get`
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Discord user ID
    pub user_id: String,
}

/// Fetch the presence once and print it
pub async fn execute(config: &AppConfig, args: &GetArgs, format: OutputFormat) -> Result<(), AppError> {
    let id = super::parse_id(&args.user_id)?;
    let ctx = SyncContext::http()?;
    let revalidator = ctx.revalidator(id, super::options(config));

    match revalidator.revalidate().await {
        RevalidateOutcome::Loaded => {
            if let Some(presence) = revalidator.state().data() {
                output::print_presences([presence], format);
            }
            Ok(())
        }
        RevalidateOutcome::Errored => match revalidator.state().phase {
            Phase::Errored { error, .. } => Err(FetchFailure::Server(error).into()),
            _ => Err(AppError::internal("Fetch reported an error but none was stored")),
        },
        RevalidateOutcome::TransportFailed(e) => Err(e),
        RevalidateOutcome::Skipped | RevalidateOutcome::Cancelled => {
            Err(AppError::cancelled("Fetch did not complete"))
        }
    }
}
