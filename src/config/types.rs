//! Configuration Types
//!
//! Runtime settings for the gateway and the remote command layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Gateway and session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Address the HTTP gateway binds to
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// HTTP port (default 3001)
    #[serde(default = "default_port")]
    pub port: u16,

    /// SSH handshake + authentication timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-command timeout in seconds (0 = wait forever)
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// SSH keep-alive interval in seconds (0 = disabled)
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_secs: u64,

    /// Directory used to stage writes. When unset, the temp file is created
    /// next to the target so the final rename stays on one filesystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<String>,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_command_timeout() -> u64 {
    60
}

fn default_keepalive_interval() -> u64 {
    30
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            command_timeout_secs: default_command_timeout(),
            keepalive_interval_secs: default_keepalive_interval(),
            staging_dir: None,
        }
    }
}

impl FinderConfig {
    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when command timeouts are disabled
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }

    pub fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive_interval_secs > 0)
            .then(|| Duration::from_secs(self.keepalive_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FinderConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(60)));
        assert!(config.staging_dir.is_none());
    }

    #[test]
    fn test_zero_disables_timeouts() {
        let config = FinderConfig {
            command_timeout_secs: 0,
            keepalive_interval_secs: 0,
            ..FinderConfig::default()
        };
        assert_eq!(config.command_timeout(), None);
        assert_eq!(config.keepalive_interval(), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FinderConfig = toml::from_str("port = 8080\nstaging_dir = \"/tmp\"").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.staging_dir.as_deref(), Some("/tmp"));
    }
}
