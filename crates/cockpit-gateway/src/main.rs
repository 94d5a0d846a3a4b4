//! cockpit gateway
//!
//! Standalone dashboard host:
//! - `/dashboard` polling every server on ports 8080-8090
//! - `/v1/metrics` backed by an owned `MetricsBuffer`
//! - `/health`
//!
//! Nothing in this binary writes to the buffer, so its own `/v1/metrics`
//! stays empty. Services that record requests embed the router and share a
//! buffer through `AppState::with_metrics`.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use cockpit_core::error::{CockpitError, Result};
use cockpit_gateway::{
    app_state::AppState,
    cli::{GatewayArgs, DEFAULT_CONFIG},
    config, obs, router,
};

#[tokio::main]
async fn main() -> ExitCode {
    obs::init_server();
    let args = GatewayArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), "{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: GatewayArgs) -> Result<()> {
    let cfg = match args.config {
        Some(path) => config::load_from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_from_file(DEFAULT_CONFIG)?,
        None => {
            tracing::info!("{DEFAULT_CONFIG} not found, using defaults");
            config::GatewayConfig::default()
        }
    };
    let listen = cfg.gateway.listen_addr()?;
    let capacity = cfg.metrics.capacity;

    let state = AppState::new(cfg);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| CockpitError::Server(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, capacity, "cockpit-gateway starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CockpitError::Server(e.to_string()))?;

    tracing::info!("cockpit-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler unavailable: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
