//! The seam between revalidation and the network.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::api::ApiConfig;
use crate::error::FetchFailure;
use crate::types::id::Snowflake;
use crate::types::presence::Presence;

/// Fetches one presence record.
///
/// Implementations must resolve to [`FetchFailure::Cancelled`] as soon as
/// `cancel` fires, aborting any in-flight request, and must reserve
/// [`FetchFailure::Server`] for well-formed error bodies from the server.
#[async_trait]
pub trait PresenceFetcher: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the current presence for `id` from the API described by `api`.
    async fn fetch(
        &self,
        id: &Snowflake,
        api: &ApiConfig,
        cancel: &CancellationToken,
    ) -> Result<Presence, FetchFailure>;
}
