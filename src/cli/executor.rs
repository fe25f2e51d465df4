//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;

/// Run the command selected on the command line; no subcommand means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            if let Some(steps) = rollback
                && steps > 50
            {
                tracing::warn!(steps, "Rolling back a large number of migrations");
            }
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use clap::Parser;

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from(["genflow", "serve", "--dry-run"]).unwrap();
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Memory;

        assert!(execute_command(&cli, settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_migrate_against_memory_store() {
        let cli = Cli::try_parse_from(["genflow", "migrate"]).unwrap();
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Memory;

        assert!(execute_command(&cli, settings).await.is_err());
    }
}
