//! Transport seam
//!
//! The session layer only needs two things from an SSH stack: open an
//! authenticated connection, and run one command on it. Both are expressed as
//! object-safe traits so the registry can hold `Box<dyn RemoteConnection>`
//! regardless of which stack produced it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Credentials for a single connection attempt
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    Password {
        password: String,
    },
    /// PEM/OpenSSH private key text (not a path)
    Key {
        private_key: String,
        passphrase: Option<String>,
    },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { .. } => write!(f, "Password(***)"),
            Self::Key { .. } => write!(f, "Key(***)"),
        }
    }
}

/// Everything needed to reach and authenticate against a remote host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
}

impl ConnectParams {
    /// `user@host:port`
    pub fn display_string(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Output of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `-1` when the channel closed without reporting an exit status
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Transport-level failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to reach {host}: {reason}")]
    Unreachable { host: String, reason: String },

    #[error("Authentication failed for {0}")]
    AuthenticationFailed(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Connection closed")]
    Closed,

    #[error("Command timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True for failures that happen while establishing a connection
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::AuthenticationFailed(_) | Self::InvalidKey(_)
        )
    }
}

/// A live, authenticated connection
#[async_trait]
pub trait RemoteConnection: Send + Sync {
    /// Run `command`, feed `stdin` (then EOF) if given, and collect the output.
    ///
    /// When `timeout` elapses the channel is closed and `TransportError::Timeout`
    /// is returned.
    async fn exec(
        &self,
        command: &str,
        stdin: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, TransportError>;

    /// Tear the connection down. Must be safe to call more than once.
    async fn close(&self);
}

/// Factory for connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn RemoteConnection>, TransportError>;
}
