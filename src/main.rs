//! starsearch - hybrid search over starred repositories.
//!
//! Main entry point for the starsearch CLI and JSON API.

mod api;
mod cli;
mod cmd_import;
mod cmd_open;
mod cmd_search;
mod register;
mod server;

use clap::Parser;
use tracing::warn;

use starsearch_config::{Config, ConfigError, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::cmd_import::handle_import;
use crate::cmd_open::handle_open;
use crate::cmd_search::{handle_search, handle_status};
use crate::server::{init_tracing, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_tracing(&config.logging, config.storage.data_dir())?;
    validate_config(&config)?;

    match cli.command {
        Commands::Search {
            query,
            limit,
            mode,
            weight,
            json,
        } => handle_search(&config, &query, limit, mode.as_deref(), weight, json).await,
        Commands::Open {
            query,
            mode,
            weight,
            print,
        } => handle_open(&config, &query, mode.as_deref(), weight, print).await,
        Commands::Import { file } => handle_import(&config, &file).await,
        Commands::Status { json } => handle_status(&config, json).await,
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            run_server(config, host, port).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    ConfigLoader::load_or_default(cli.config.as_deref())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let result = ConfigValidator::validate(config)?;
    for warning in &result.warnings {
        warn!("Config: {}: {}", warning.path, warning.message);
    }
    match ConfigError::from_validation(&result) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
