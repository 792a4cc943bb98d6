//! Gateway wire types
//!
//! Field names follow the browser client (`camelCase`). Required fields are
//! modelled as `Option` so a missing value becomes a 400 with a readable
//! message instead of a generic deserialization rejection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::FinderError;
use crate::remote::DirectoryEntry;
use crate::ssh::{AuthMethod, ConnectParams};

pub const DEFAULT_SSH_PORT: u16 = 22;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub passphrase: Option<String>,
}

impl ConnectRequest {
    /// Validate and pick exactly one credential (password wins over key).
    pub fn into_params(self) -> Result<ConnectParams, FinderError> {
        let missing = || FinderError::Validation("Missing required connection parameters".into());

        let host = non_empty(self.host).ok_or_else(missing)?;
        let username = non_empty(self.username).ok_or_else(missing)?;

        let auth = match (non_empty(self.password), non_empty(self.private_key)) {
            (Some(password), _) => AuthMethod::Password { password },
            (None, Some(private_key)) => AuthMethod::Key {
                private_key,
                passphrase: non_empty(self.passphrase),
            },
            (None, None) => return Err(missing()),
        };

        Ok(ConnectParams {
            host,
            port: self.port.unwrap_or(DEFAULT_SSH_PORT),
            username,
            auth,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub session_id: Option<String>,
    pub path: Option<String>,
    /// Only the literal string `"true"` enables hidden entries
    pub show_hidden: Option<String>,
}

impl ListQuery {
    pub fn include_hidden(&self) -> bool {
        self.show_hidden.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadFileQuery {
    pub session_id: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileRequest {
    pub session_id: Option<String>,
    pub path: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub session_id: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub session_id: String,
    pub home_dir: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

/// One node of the file tree, keyed by its path
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItem {
    pub index: String,
    pub is_folder: bool,
    pub data: DirectoryEntry,
    /// Present (and empty) for directories; filled lazily on expand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

/// Listing response: path → node, in listing order
pub type TreeListing = IndexMap<String, TreeItem>;

pub fn to_tree(entries: Vec<DirectoryEntry>) -> TreeListing {
    entries
        .into_iter()
        .map(|entry| {
            let item = TreeItem {
                index: entry.path.clone(),
                is_folder: entry.is_directory,
                children: entry.is_directory.then(Vec::new),
                data: entry,
            };
            (item.index.clone(), item)
        })
        .collect()
}

/// Require a non-empty field or fail with `message`
pub fn require(value: Option<String>, message: &str) -> Result<String, FinderError> {
    non_empty(value).ok_or_else(|| FinderError::Validation(message.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
