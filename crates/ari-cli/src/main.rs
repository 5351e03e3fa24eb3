#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod config;
mod readiness;
mod server;

use std::process;

use anyhow::Context;
use ari_server::handler::routes;
use ari_server::service::ServiceState;
use axum::Router;
use clap::Parser;

use crate::config::Cli;

/// Tracing target for gateway startup events.
pub const TRACING_TARGET_STARTUP: &str = "ari_cli::startup";
/// Tracing target for gateway shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "ari_cli::shutdown";
/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "ari_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "Gateway terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "Gateway terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    Cli::init_tracing();
    cli.log();
    cli.validate().context("invalid configuration")?;

    let state = ServiceState::from_config(
        cli.ollama.clone(),
        cli.comfy.clone(),
        cli.gateway.clone(),
    )
    .context("failed to initialize gateway state")?;

    if cli.skip_readiness {
        tracing::info!(
            target: TRACING_TARGET_STARTUP,
            "Skipping upstream readiness probes"
        );
    } else {
        readiness::probe_upstreams(&state).await;
    }

    let router: Router = routes().with_state(state);
    server::serve(router, cli.server).await?;

    Ok(())
}
