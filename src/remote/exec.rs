//! Command Executor
//!
//! Runs one command line on a session's connection. Commands on the same
//! session are serialized by the session's exec lock; commands on different
//! sessions never contend.

use tracing::{debug, warn};

use crate::error::FinderError;
use crate::session::Session;
use crate::ssh::CommandResult;

impl Session {
    /// Run `command` and collect stdout, stderr and the exit code.
    ///
    /// A non-zero exit is *not* an error here; callers decide what it means.
    pub async fn execute(&self, command: &str) -> Result<CommandResult, FinderError> {
        self.run(command, None).await
    }

    /// Like `execute`, but streams `input` to the command's stdin followed by EOF.
    pub async fn execute_with_input(
        &self,
        command: &str,
        input: &[u8],
    ) -> Result<CommandResult, FinderError> {
        self.run(command, Some(input)).await
    }

    async fn run(&self, command: &str, input: Option<&[u8]>) -> Result<CommandResult, FinderError> {
        let _guard = self.exec_lock.lock().await;
        debug!("[session {}] Executing: {}", self.id, command);

        let result = self
            .connection
            .exec(command, input, self.command_timeout)
            .await
            .map_err(|e| {
                warn!("[session {}] Command failed to run: {}", self.id, e);
                FinderError::from(e)
            })?;

        debug!(
            "[session {}] exit={} stdout={}B stderr={}B",
            self.id,
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}
