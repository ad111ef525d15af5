//! CLI module for Cronos API
//!
//! Provides subcommands:
//! - `serve`: run the HTTP server
//! - `migrate`: apply or revert the storage schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Cronos API - user registry service
#[derive(Parser)]
#[command(name = "cronos-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending migrations, or revert the latest one
    Migrate(migrate::MigrateArgs),
}

/// Read `.env`, load the configuration and install logging
///
/// A configuration that fails to load is replaced by the defaults, and the
/// failure is reported once logging is up.
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = AppConfig::load_or_default();
    init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Configuration could not be loaded, running with defaults");
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["cronos-api", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn test_parse_migrate_revert() {
        let cli = Cli::try_parse_from(["cronos-api", "migrate", "--revert"]).unwrap();

        match cli.command {
            Command::Migrate(args) => assert!(args.revert),
            Command::Serve => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["cronos-api"]).is_err());
    }
}
