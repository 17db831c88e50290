//! CLI command definitions and dispatch.

pub mod config;
pub mod get;
pub mod poll;
pub mod watch;

use clap::{Parser, Subcommand};

use lanyard_core::config::AppConfig;
use lanyard_core::error::AppError;
use lanyard_core::types::{Options, Snowflake};

use crate::output::OutputFormat;

/// Lanyard presence command-line client
#[derive(Parser, Debug)]
#[command(name = "lanyard", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: String,

    /// Output format (table or json)
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Override the API host, e.g. `localhost:4001`
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// Use plain `http`/`ws` instead of TLS
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a user's presence once over REST
    Get(get::GetArgs),
    /// Revalidate a user's presence on an interval and print each state
    Poll(poll::PollArgs),
    /// Stream presences over the socket until interrupted
    Watch(watch::WatchArgs),
    /// Inspect configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<(), AppError> {
        match &self.command {
            Commands::Get(args) => get::execute(&self.load_config()?, args, self.format).await,
            Commands::Poll(args) => poll::execute(&self.load_config()?, args, self.format).await,
            Commands::Watch(args) => watch::execute(&self.load_config()?, args, self.format).await,
            Commands::Config(cmd) => config::execute(&self, cmd).await,
        }
    }

    /// Load configuration, then apply command-line overrides
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let mut config = AppConfig::load_from(&self.config)?;
        if let Some(hostname) = &self.hostname {
            config.api.hostname = hostname.clone();
        }
        if self.insecure {
            config.api.secure = false;
        }
        Ok(config)
    }
}

/// Observer options for the configured API
pub fn options(config: &AppConfig) -> Options {
    Options::with_api(config.api.clone())
}

/// Parse a user id argument
pub fn parse_id(raw: &str) -> Result<Snowflake, AppError> {
    Snowflake::parse(raw)
}
