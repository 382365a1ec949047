use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use trade_helper::application::{Cli, CommandExecutor};
use trade_helper::shared::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load base configuration from file if provided
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => AppConfig::default(),
    };

    // Override with CLI args if provided (CLI has higher priority)
    cli.apply_network_overrides(&mut config);

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
