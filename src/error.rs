//! Core error types

use thiserror::Error;

use crate::ssh::TransportError;

/// Errors surfaced by the session, command and file layers
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Session not found or expired: {0}")]
    SessionNotFound(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("{message}")]
    CommandFailed { message: String, stderr: String },

    #[error("Failed to create temp file: {stderr}")]
    WriteStage { stderr: String },

    #[error("Failed to save file: {stderr}")]
    WriteRelocate { stderr: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote operation timed out after {0}s")]
    Timeout(u64),
}

impl FinderError {
    pub fn command_failed(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// HTTP status the gateway reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::SessionNotFound(_) => 404,
            Self::Timeout(_) => 504,
            Self::Connection(_)
            | Self::CommandFailed { .. }
            | Self::WriteStage { .. }
            | Self::WriteRelocate { .. }
            | Self::Transport(_) => 500,
        }
    }

    /// Remote diagnostic text, when the failure came from a remote command
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. }
            | Self::WriteStage { stderr }
            | Self::WriteRelocate { stderr } => Some(stderr),
            _ => None,
        }
    }
}

impl From<TransportError> for FinderError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(secs) => Self::Timeout(secs),
            e if e.is_connect_failure() => Self::Connection(e.to_string()),
            e => Self::Transport(e.to_string()),
        }
    }
}

impl serde::Serialize for FinderError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
