use std::process::ExitCode;

use tracing::{error, info};

use subway_server::config::ServerConfig;
use subway_server::registry::{Snapshot, SnapshotConfig, StationRegistry};
use subway_server::telemetry;
use subway_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let registry = match &config.snapshot_path {
        Some(path) => StationRegistry::with_snapshot(Snapshot::new(SnapshotConfig::new(path)))?,
        None => {
            info!("no snapshot path configured, stations are kept in memory only");
            StationRegistry::in_memory()
        }
    };
    info!(stations = registry.len().await, "registry ready");

    let app = create_router(AppState::new(registry));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Subway station registry listening on http://{}", listener.local_addr()?);
    info!("  GET    /health         - Health check");
    info!("  GET    /stations       - List stations");
    info!("  POST   /stations       - Create a station");
    info!("  DELETE /stations/:id   - Delete a station");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
