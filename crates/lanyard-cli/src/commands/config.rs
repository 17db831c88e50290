//! Configuration inspection commands.

use clap::Subcommand;

use lanyard_core::error::AppError;

use super::Cli;
use crate::output::{self, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Write a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(cli: &Cli, command: &ConfigCommand) -> Result<(), AppError> {
    match command {
        ConfigCommand::Show => {
            let config = cli.load_config()?;
            match cli.format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => {
                    println!("API");
                    output::print_kv("hostname", &config.api.hostname);
                    output::print_kv("secure", &config.api.secure.to_string());
                    output::print_kv("socket", &config.api.socket_url());
                    output::print_kv("timeout", &format!("{}s", config.api.request_timeout_seconds));
                    println!("Realtime");
                    output::print_kv("heartbeat", &format!("{}ms", config.realtime.default_heartbeat_ms));
                    output::print_kv(
                        "backoff",
                        &format!(
                            "{}ms..{}ms x{}",
                            config.realtime.initial_backoff_ms,
                            config.realtime.max_backoff_ms,
                            config.realtime.backoff_multiplier
                        ),
                    );
                    output::print_kv(
                        "connect timeout",
                        &format!("{}s", config.realtime.connect_timeout_seconds),
                    );
                    println!("Watch");
                    output::print_kv("users", &config.watch.user_ids.join(", "));
                    output::print_kv("mode", &format!("{:?}", config.watch.mode).to_lowercase());
                    output::print_kv("poll interval", &format!("{}s", config.watch.poll_interval_seconds));
                    println!("Logging");
                    output::print_kv("level", &config.logging.level);
                    output::print_kv("format", &config.logging.format);
                }
            }
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", cli.config));
                output::print_kv("api", &config.api.hostname);
                output::print_kv("users", &config.watch.user_ids.len().to_string());
                for raw in &config.watch.user_ids {
                    if let Err(e) = super::parse_id(raw) {
                        output::print_warning(&format!("watch.user_ids: {}", e.message));
                    }
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {}", e)))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {}", e)))?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

