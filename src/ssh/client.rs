//! russh-backed transport
//!
//! One `RusshConnection` wraps one authenticated `client::Handle`. Every
//! command gets its own exec channel; stdout (`Data`) and stderr
//! (`ExtendedData { ext: 1 }`) arrive interleaved on the channel's single
//! message queue, so both streams are drained together and neither can stall
//! the other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::keys::ssh_key::{self, HashAlg};
use russh::keys::{decode_secret_key, PrivateKeyWithHashAlg};
use russh::{Channel, ChannelMsg, Disconnect};
use tracing::{debug, info, warn};

use super::transport::{
    AuthMethod, CommandResult, ConnectParams, Connector, RemoteConnection, TransportError,
};
use crate::config::FinderConfig;

/// Client-side protocol callbacks.
pub struct ClientHandler {
    host: String,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    // No known_hosts store: every host key is accepted and its fingerprint logged.
    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!(
            "Host key for {}: {}",
            self.host,
            server_public_key.fingerprint(HashAlg::Sha256)
        );
        Ok(true)
    }
}

/// Opens russh connections using timeouts from `FinderConfig`.
#[derive(Debug, Clone)]
pub struct RusshConnector {
    connect_timeout: Duration,
    keepalive_interval: Option<Duration>,
}

impl RusshConnector {
    pub fn new(config: &FinderConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            keepalive_interval: config.keepalive_interval(),
        }
    }

    async fn connect_and_authenticate(
        &self,
        params: &ConnectParams,
    ) -> Result<Handle<ClientHandler>, TransportError> {
        let config = Arc::new(client::Config {
            keepalive_interval: self.keepalive_interval,
            inactivity_timeout: None,
            ..Default::default()
        });
        let handler = ClientHandler {
            host: params.host.clone(),
        };

        let mut handle = client::connect(config, (params.host.as_str(), params.port), handler)
            .await
            .map_err(|e| TransportError::Unreachable {
                host: params.host.clone(),
                reason: e.to_string(),
            })?;

        let auth_error = |e: russh::Error| TransportError::Unreachable {
            host: params.host.clone(),
            reason: e.to_string(),
        };

        let authenticated = match &params.auth {
            AuthMethod::Password { password } => handle
                .authenticate_password(&params.username, password)
                .await
                .map_err(auth_error)?
                .success(),
            AuthMethod::Key {
                private_key,
                passphrase,
            } => {
                let key = decode_secret_key(private_key, passphrase.as_deref())
                    .map_err(|e| TransportError::InvalidKey(e.to_string()))?;
                let hash_alg = handle
                    .best_supported_rsa_hash()
                    .await
                    .map_err(auth_error)?
                    .flatten();
                handle
                    .authenticate_publickey(
                        &params.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(auth_error)?
                    .success()
            }
        };

        if !authenticated {
            return Err(TransportError::AuthenticationFailed(params.display_string()));
        }

        Ok(handle)
    }
}

impl Default for RusshConnector {
    fn default() -> Self {
        Self::new(&FinderConfig::default())
    }
}

#[async_trait]
impl Connector for RusshConnector {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn RemoteConnection>, TransportError> {
        let handle = tokio::time::timeout(self.connect_timeout, self.connect_and_authenticate(params))
            .await
            .map_err(|_| TransportError::Unreachable {
                host: params.host.clone(),
                reason: format!("timed out after {}s", self.connect_timeout.as_secs()),
            })??;

        info!("SSH connection established to {}", params.display_string());

        Ok(Box::new(RusshConnection {
            handle,
            label: params.display_string(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// A live russh client connection.
pub struct RusshConnection {
    handle: Handle<ClientHandler>,
    label: String,
    closed: AtomicBool,
}

#[async_trait]
impl RemoteConnection for RusshConnection {
    async fn exec(
        &self,
        command: &str,
        stdin: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| TransportError::Channel(format!("Failed to open channel: {}", e)))?;

        let Some(limit) = timeout else {
            return run_on_channel(&mut channel, command, stdin).await;
        };

        let outcome = tokio::time::timeout(limit, run_on_channel(&mut channel, command, stdin)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!("Command on {} timed out after {:?}, closing channel", self.label, limit);
                let _ = channel.close().await;
                Err(TransportError::Timeout(limit.as_secs()))
            }
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "Session closed", "en")
            .await
        {
            warn!("Error during disconnect from {}: {}", self.label, e);
        }
        info!("Closed SSH connection to {}", self.label);
    }
}

async fn run_on_channel(
    channel: &mut Channel<Msg>,
    command: &str,
    stdin: Option<&[u8]>,
) -> Result<CommandResult, TransportError> {
    channel
        .exec(true, command)
        .await
        .map_err(|e| TransportError::Channel(format!("Failed to exec: {}", e)))?;

    if let Some(input) = stdin {
        channel
            .data(input)
            .await
            .map_err(|e| TransportError::Channel(format!("Failed to write stdin: {}", e)))?;
        channel
            .eof()
            .await
            .map_err(|e| TransportError::Channel(format!("Failed to send EOF: {}", e)))?;
    }

    let mut result = CommandResult {
        exit_code: -1,
        ..Default::default()
    };

    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => result.stdout.extend_from_slice(&data),
            Some(ChannelMsg::ExtendedData { data, ext: 1 }) => {
                result.stderr.extend_from_slice(&data)
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                result.exit_code = exit_status as i32;
            }
            Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                debug!("Remote command killed by signal {:?}", signal_name);
            }
            Some(ChannelMsg::Close) | None => break,
            Some(_) => {}
        }
    }

    Ok(result)
}
