//! Session types

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::ssh::RemoteConnection;

/// One live remote connection plus the metadata cached at connect time.
///
/// The connection is owned exclusively by the session and is closed when the
/// session is removed from the registry.
pub struct Session {
    pub id: String,
    pub host: String,
    pub username: String,
    /// Remote `$HOME`, or `/` when it could not be determined
    pub home_dir: String,
    pub created_at: DateTime<Utc>,
    pub(crate) connection: Box<dyn RemoteConnection>,
    /// Held for the duration of one command
    pub(crate) exec_lock: Mutex<()>,
    pub(crate) command_timeout: Option<Duration>,
}

impl Session {
    pub(crate) fn new(
        id: String,
        host: String,
        username: String,
        home_dir: String,
        connection: Box<dyn RemoteConnection>,
        command_timeout: Option<Duration>,
    ) -> Self {
        Self {
            id,
            host,
            username,
            home_dir,
            created_at: Utc::now(),
            connection,
            exec_lock: Mutex::new(()),
            command_timeout,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("home_dir", &self.home_dir)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
