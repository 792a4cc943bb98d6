//! Test transport that runs every command through a local `sh -c`.
//!
//! Each username gets its own home directory under a shared temp root, so
//! quoting, `ls` parsing and rename atomicity are exercised against a real
//! POSIX shell.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use sshfinder_lib::config::FinderConfig;
use sshfinder_lib::session::{Session, SessionRegistry};
use sshfinder_lib::ssh::{
    AuthMethod, CommandResult, ConnectParams, Connector, RemoteConnection, TransportError,
};

pub const PASSWORD: &str = "secret";
pub const UNREACHABLE_HOST: &str = "unreachable.invalid";
/// Connecting as this user yields an empty `$HOME`
pub const NO_HOME_USER: &str = "nohome";
/// Connections for this user stall before delivering stdin
pub const SLOW_LINK_USER: &str = "slowlink";
const SLOW_LINK_DELAY: Duration = Duration::from_secs(3);

pub struct LocalShellConnector {
    root: PathBuf,
    pub closes: Arc<AtomicUsize>,
}

impl LocalShellConnector {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Connector for LocalShellConnector {
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn RemoteConnection>, TransportError> {
        if params.host == UNREACHABLE_HOST {
            return Err(TransportError::Unreachable {
                host: params.host.clone(),
                reason: "no route to host".into(),
            });
        }
        match &params.auth {
            AuthMethod::Password { password } if password == PASSWORD => {}
            AuthMethod::Key { .. } => {}
            _ => return Err(TransportError::AuthenticationFailed(params.display_string())),
        }

        let home = self.root.join(&params.username);
        std::fs::create_dir_all(&home)?;
        let home_env = if params.username == NO_HOME_USER {
            String::new()
        } else {
            home.display().to_string()
        };

        Ok(Box::new(LocalShellConnection {
            home,
            home_env,
            slow_stdin: params.username == SLOW_LINK_USER,
            closed: AtomicBool::new(false),
            closes: self.closes.clone(),
        }))
    }
}

pub struct LocalShellConnection {
    home: PathBuf,
    home_env: String,
    slow_stdin: bool,
    closed: AtomicBool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteConnection for LocalShellConnection {
    async fn exec(
        &self,
        command: &str,
        stdin: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.home)
            .env("HOME", &self.home_env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let pipe = child.stdin.take();
        let slow_stdin = self.slow_stdin && stdin.is_some();
        let output = async move {
            if let Some(mut pipe) = pipe {
                if let Some(input) = stdin {
                    if slow_stdin {
                        tokio::time::sleep(SLOW_LINK_DELAY).await;
                    }
                    // A command that exits without reading stdin closes the pipe early
                    if let Err(e) = pipe.write_all(input).await {
                        if e.kind() != std::io::ErrorKind::BrokenPipe {
                            return Err(e);
                        }
                    }
                }
            }
            child.wait_with_output().await
        };
        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| TransportError::Timeout(limit.as_secs()))??,
            None => output.await?,
        };

        Ok(CommandResult {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct Harness {
    _dir: TempDir,
    pub root: PathBuf,
    pub registry: Arc<SessionRegistry>,
    pub closes: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(FinderConfig::default())
    }

    pub fn with_config(config: FinderConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let connector = LocalShellConnector::new(&root);
        let closes = connector.closes.clone();
        let registry = Arc::new(SessionRegistry::new(Arc::new(connector), &config));
        Self {
            _dir: dir,
            root,
            registry,
            closes,
        }
    }

    /// Home directory a session for `username` will get
    pub fn home_of(&self, username: &str) -> PathBuf {
        self.root.join(username)
    }

    pub async fn connect(&self, username: &str) -> Arc<Session> {
        let (id, _) = self.registry.create(params(username)).await.unwrap();
        self.registry.get(&id).unwrap()
    }
}

pub fn params(username: &str) -> ConnectParams {
    ConnectParams {
        host: "localhost".into(),
        port: 22,
        username: username.into(),
        auth: AuthMethod::Password {
            password: PASSWORD.into(),
        },
    }
}

pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}
