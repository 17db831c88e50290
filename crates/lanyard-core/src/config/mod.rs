//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files and `LANYARD__*` environment variables. Every field
//! has a default, so an empty configuration is valid.

pub mod api;
pub mod logging;
pub mod realtime;
pub mod watch;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::api::ApiConfig;
use self::logging::LoggingConfig;
use self::realtime::RealtimeConfig;
use self::watch::WatchConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Validate, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lanyard API endpoint.
    #[serde(default)]
    #[validate(nested)]
    pub api: ApiConfig,
    /// Streaming client settings.
    #[serde(default)]
    #[validate(nested)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Users followed by the watcher daemon.
    #[serde(default)]
    #[validate(nested)]
    pub watch: WatchConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay and environment
    /// variables prefixed with `LANYARD__`. Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));

        Self::finish(builder)
    }

    /// Load configuration from one explicit file plus environment variables.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("LANYARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("watch.user_ids"),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        if parsed.realtime.initial_backoff_ms > parsed.realtime.max_backoff_ms {
            return Err(AppError::configuration(
                "realtime.initial_backoff_ms must not exceed realtime.max_backoff_ms",
            ));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load_from("does/not/exist").expect("defaults");
        assert_eq!(config.api.hostname, "api.lanyard.rest");
        assert!(config.api.secure);
        assert_eq!(config.realtime.default_heartbeat_ms, 10_000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.watch.poll_interval_seconds, 30);
        assert!(config.watch.user_ids.is_empty());
    }

    #[test]
    fn test_default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.watch.poll_interval_seconds = 0;
        assert!(config.validate().is_err());
    }
}
