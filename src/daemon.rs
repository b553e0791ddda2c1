//! vaultsort daemon (vaultsortd)
//!
//! Watches the vault in the foreground and files notes as they change.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "vaultsortd")]
#[command(author, version, about = "vaultsort background watcher")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vault directory (overrides the configured one)
    #[arg(long, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Fall back to the configured level when neither VAULTSORT_LOG nor -v is given
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        vaultsort::Config::load(cli.config.as_deref())
            .map(|c| c.general.log_level)
            .unwrap_or_else(|_| "info".to_string())
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("VAULTSORT_LOG").unwrap_or(log_level),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!("vaultsortd {} starting", vaultsort::VERSION);
    vaultsort::service::run(cli.config, cli.vault).await
}
