//! CLI argument parsing with clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;
use crate::config::{Environment, StoreBackend};

/// Asynchronous generation job service
#[derive(Parser, Debug)]
#[command(name = "genflow")]
#[command(about = "Asynchronous generation job service")]
#[command(long_about = "
Genflow accepts generation requests over HTTP, stores them as jobs, hands
them to a worker pool through a Redis stream and records the outcome the
workers report back.

EXAMPLES:
    # Start the server with the layered configuration in ./config
    genflow serve

    # Bind to all interfaces on port 8080
    genflow serve --host 0.0.0.0 --port 8080

    # Run without PostgreSQL or Redis (jobs are kept in memory, never delivered)
    genflow serve --store memory --no-broker

    # Check configuration without starting the server
    genflow serve --dry-run

    # Apply, preview or roll back database migrations
    genflow migrate
    genflow migrate --dry-run
    genflow migrate --rollback 1
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read this single TOML file instead of the layered config directory
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Environment whose `{env}.toml` layer is loaded
    #[arg(short, long, value_enum)]
    pub env: Option<EnvironmentArg>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Error-level logging only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level, overrides --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Job store backend
        #[arg(long, value_enum)]
        store: Option<StoreArg>,

        /// Start with the no-op publisher; jobs are accepted but never delivered
        #[arg(long)]
        no_broker: bool,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the last STEPS migrations (1-100)
        #[arg(long, value_name = "STEPS", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentArg {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreArg {
    Postgres,
    Memory,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<EnvironmentArg> for Environment {
    fn from(env: EnvironmentArg) -> Self {
        match env {
            EnvironmentArg::Development => Environment::Development,
            EnvironmentArg::Test => Environment::Test,
            EnvironmentArg::Staging => Environment::Staging,
            EnvironmentArg::Production => Environment::Production,
        }
    }
}

impl From<StoreArg> for StoreBackend {
    fn from(store: StoreArg) -> Self {
        match store {
            StoreArg::Postgres => StoreBackend::Postgres,
            StoreArg::Memory => StoreBackend::Memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["genflow", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["genflow"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "genflow", "serve", "--port", "8080", "--store", "memory", "--no-broker",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Serve {
                port,
                store,
                no_broker,
                dry_run,
                ..
            }) => {
                assert_eq!(port, Some(8080));
                assert_eq!(store, Some(StoreArg::Memory));
                assert!(no_broker);
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_env_alias() {
        let cli = Cli::try_parse_from(["genflow", "--env", "prod"]).unwrap();
        assert_eq!(
            cli.env.map(Environment::from),
            Some(Environment::Production)
        );
    }

    #[test]
    fn test_migrate_flags_conflict() {
        let err = Cli::try_parse_from(["genflow", "migrate", "--dry-run", "--rollback", "2"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["genflow", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
