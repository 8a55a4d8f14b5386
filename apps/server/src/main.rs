//! User Directory Server
//!
//! The server handles:
//! - Account registration (`POST /api_v1/registrate`)
//! - Credential checks (`POST /api_v1/login`)
//! - Basic-auth protected user lookup (`GET|POST /api_v1/me`)
//! - Stateless logout (`PUT /api_v1/logout`)

use std::time::Duration;

use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use user_directory_server::{create_app, init_tracing, AppState, ServerConfig};

/// How long to wait for the registry to drain after the server stops
const REGISTRY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::load()?;

    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        ask_timeout_ms = config.ask_timeout_ms,
        mailbox_capacity = ?config.mailbox_capacity,
        "Starting User Directory Server"
    );

    // Initialize application state (starts the registry processor)
    let (state, processor) = AppState::new(config.clone());

    let app = create_app(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // All gateway handles are gone once the router is dropped
    match tokio::time::timeout(REGISTRY_DRAIN_TIMEOUT, processor).await {
        Ok(Ok(store)) => info!(users = store.len(), "User registry stopped"),
        Ok(Err(e)) => warn!(error = %e, "User registry task failed"),
        Err(_) => warn!("User registry did not stop in time"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
