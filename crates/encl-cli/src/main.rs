//! # Enclave CLI
//!
//! Manage your enclave platform from your terminal.

#![forbid(unsafe_code)]

use clap::Parser;
use encl_cli::{
    cli::Cli,
    commands::{run, Context},
    config::CliConfig,
    output::error,
    CliError,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match CliConfig::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };
    tracing::debug!(api_server_url = %config.api_server_url, source = ?config.source, "Configuration loaded");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let ctx = Context::new(&config, cli.strict, cancel);

    // Execute command
    match run(cli.command, &ctx).await {
        Ok(()) => {}
        Err(CliError::Cancelled) => {
            error("Interrupted");
            std::process::exit(130);
        }
        Err(e) => {
            error(&e.to_string());
            std::process::exit(1);
        }
    }
}
