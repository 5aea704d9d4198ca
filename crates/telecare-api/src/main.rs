//! Main entry point for the telecare API server

use std::net::SocketAddr;
use std::sync::Arc;
use telecare_api::build_router;
use telecare_core::{
    Config, context_error,
    context_error::{Result, ResultExt},
    init_logging,
};
use telecare_tracker::{TrackerConfig, TrackerService};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Failed to load config ({err}), using defaults");
        Config::default()
    });

    init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting telecare API server"
    );

    let tracker_config = TrackerConfig::load().context(|| "Failed to load tracker config")?;
    let tracker = Arc::new(
        TrackerService::new(tracker_config).context(|| "Failed to create tracker service")?,
    );
    tracker
        .start()
        .context(|| "Failed to start tracker service")?;

    let app = build_router(config.clone(), tracker.clone());

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .map_err(|e| context_error!("Invalid server address: {}", e))?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| context_error!("Failed to bind to {}: {}", addr, e))?;

    info!(%addr, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| context_error!("Server error: {}", e))?;

    if let Err(e) = tracker.stop().await {
        warn!(error = %e, "Tracker did not stop cleanly");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down gracefully...");
        },
    }
}
