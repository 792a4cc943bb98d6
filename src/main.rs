use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sshfinder_lib::config::FinderConfig;
use sshfinder_lib::gateway::{self, AppState};
use sshfinder_lib::session::SessionRegistry;
use sshfinder_lib::ssh::RusshConnector;

const DEFAULT_LOG_FILTER: &str = "sshfinder=info,sshfinder_lib=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = FinderConfig::load().context("Failed to load configuration")?;
    tracing::debug!("Effective configuration: {:?}", config);

    let connector = Arc::new(RusshConnector::new(&config));
    let registry = Arc::new(SessionRegistry::new(connector, &config));

    gateway::serve(AppState::new(registry, config))
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
