//! HTTP gateway
//!
//! Exposes the session and file operations to the browser client and owns
//! process shutdown: when the server stops, every SSH session is closed.

mod protocol;
mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

pub use protocol::*;
pub use routes::{router, AppState};

/// Serve until Ctrl-C / SIGTERM, then close every session.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let address = state.config.bind_address();
    let registry = Arc::clone(&state.registry);

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", listener.local_addr()?);

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    registry.close_all().await;
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing all SSH connections...");
}
