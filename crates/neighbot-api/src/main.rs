//! NeighBot entry point.
//!
//! Binary name: `neighbot`
//!
//! Resolves the config directory, wires the store, LLM client and adapters,
//! then runs until Ctrl+C or SIGTERM and flushes all state to disk.

mod cli;
mod state;

use anyhow::Context as _;
use clap::Parser;

use neighbot_infra::filesystem::{CONFIG_DIR_ENV, config_dir_from_env};
use neighbot_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::Cli;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        verbosity: cli.verbose,
        json: cli.json_logs,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config_dir = config_dir_from_env(cli.config_dir.clone()).with_context(|| {
        format!("no config directory: set {CONFIG_DIR_ENV} or pass --config-dir")
    })?;

    let mut app = AppState::init(config_dir).await?;
    let running = app.start().await?;
    tracing::info!(adapters = running, "neighbot running, press Ctrl+C to stop");

    shutdown_signal().await;
    tracing::info!("shutdown signal received");

    let result = app.shutdown().await;
    shutdown_tracing();
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
