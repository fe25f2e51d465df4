use clap::Parser;
use genflow::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    execute_command(&cli, settings).await.inspect_err(|e| {
        tracing::error!(error = format!("{e:#}"), "genflow exited with an error");
    })
}
