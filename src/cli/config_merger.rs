//! Applies CLI flags on top of file and environment configuration.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

/// Holds the file/env configuration until CLI overrides are applied.
///
/// The base is loaded unvalidated: a flag such as `--store memory` can make
/// an otherwise incomplete file valid, so validation runs after merging.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way the CLI asks for it.
    ///
    /// `--config` selects a single file, otherwise the layered directory is
    /// used. `--env` picks the environment layer in both cases.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match cli.config {
            Some(ref path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(Environment::from(env)),
            None => loader,
        };

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Apply CLI overrides and validate the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(ref command) = cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                log_level,
                store,
                no_broker,
                dry_run: _,
            } => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                // Beats --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
                if let Some(store) = store {
                    config.store.backend = (*store).into();
                }
                if *no_broker {
                    config.broker.enabled = false;
                }
            }
            Commands::Migrate { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use clap::Parser;
    use std::io::Write;

    fn merger() -> ConfigurationMerger {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/genflow".to_string();
        ConfigurationMerger::new(config)
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        merger().merge_cli_args(&Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_global_log_flags() {
        assert_eq!(merge(&["genflow", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["genflow", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&[
            "genflow", "serve", "--host", "0.0.0.0", "--port", "8080", "--no-broker",
        ])
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(!config.broker.enabled);
    }

    #[test]
    fn test_command_log_level_beats_global_flag() {
        let config = merge(&["genflow", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        let merger = ConfigurationMerger::new(Settings::default());

        let postgres = Cli::try_parse_from(["genflow", "serve"]).unwrap();
        assert!(merger.merge_cli_args(&postgres).is_err());

        let memory = Cli::try_parse_from(["genflow", "serve", "--store", "memory"]).unwrap();
        let config = merger.merge_cli_args(&memory).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_load_from_single_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 4100\n\n[store]\nbackend = \"memory\"\n\n[broker]\nenabled = false"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["genflow", "--config", path.as_str(), "serve"]).unwrap();

        let merger = ConfigurationMerger::load(&cli).unwrap();
        let config = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(!config.broker.enabled);
    }
}
