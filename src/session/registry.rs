//! Session Registry
//!
//! Maps opaque session ids to live sessions. This is the only process-wide
//! mutable state: empty at startup, filled by `create`, drained by `remove`
//! and `close_all`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::join_all;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};

use super::types::Session;
use crate::config::FinderConfig;
use crate::error::FinderError;
use crate::ssh::{ConnectParams, Connector, RemoteConnection};

/// Home directory used when the remote probe fails
pub const FALLBACK_HOME: &str = "/";

/// Registry of live sessions
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
    connector: Arc<dyn Connector>,
    command_timeout: Option<Duration>,
}

impl SessionRegistry {
    pub fn new(connector: Arc<dyn Connector>, config: &FinderConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            connector,
            command_timeout: config.command_timeout(),
        }
    }

    /// Connect, probe the home directory and register a new session.
    ///
    /// Returns `(session_id, home_dir)`.
    pub async fn create(&self, params: ConnectParams) -> Result<(String, String), FinderError> {
        if params.host.trim().is_empty() || params.username.trim().is_empty() {
            return Err(FinderError::Validation(
                "Missing required connection parameters".to_string(),
            ));
        }

        let connection = self
            .connector
            .connect(&params)
            .await
            .map_err(|e| FinderError::Connection(e.to_string()))?;

        let home_dir = probe_home_dir(connection.as_ref(), self.command_timeout).await;

        let session_id = loop {
            let candidate = generate_session_id();
            if let Entry::Vacant(slot) = self.sessions.entry(candidate.clone()) {
                slot.insert(Arc::new(Session::new(
                    candidate.clone(),
                    params.host.clone(),
                    params.username.clone(),
                    home_dir.clone(),
                    connection,
                    self.command_timeout,
                )));
                break candidate;
            }
        };

        info!(
            "Connected to {} as {}, home directory: {} (session {})",
            params.host, params.username, home_dir, session_id
        );

        Ok((session_id, home_dir))
    }

    pub fn get(&self, session_id: &str) -> Result<Arc<Session>, FinderError> {
        self.sessions
            .get(session_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| FinderError::SessionNotFound(session_id.to_string()))
    }

    /// Close and forget a session. Returns whether it existed; unknown ids are a no-op.
    pub async fn remove(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, session)) => {
                session.connection.close().await;
                info!("Closed SSH connection for session {}", session_id);
                true
            }
            None => {
                debug!("Disconnect for unknown session {}", session_id);
                false
            }
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Close every connection and clear the registry (shutdown path)
    pub async fn close_all(&self) {
        let ids: Vec<String> = self.sessions.iter().map(|r| r.key().clone()).collect();
        info!("Closing {} SSH session(s)", ids.len());
        join_all(ids.iter().map(|id| self.remove(id))).await;
    }
}

/// 128 bits from the OS CSPRNG, hex encoded
fn generate_session_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

async fn probe_home_dir(connection: &dyn RemoteConnection, timeout: Option<Duration>) -> String {
    match connection.exec("echo $HOME", None, timeout).await {
        Ok(result) if result.success() && result.stderr.is_empty() => {
            let home = result.stdout_text().trim().to_string();
            if home.is_empty() {
                warn!("Remote $HOME is empty, falling back to {}", FALLBACK_HOME);
                FALLBACK_HOME.to_string()
            } else {
                home
            }
        }
        Ok(result) => {
            warn!(
                "Could not determine home directory (exit {}): {}",
                result.exit_code,
                result.stderr_text().trim()
            );
            FALLBACK_HOME.to_string()
        }
        Err(e) => {
            warn!("Could not determine home directory: {}", e);
            FALLBACK_HOME.to_string()
        }
    }
}
