//! File Access
//!
//! Reads go through `cat`. Writes are staged into a uniquely named temp file
//! (content on stdin, never in the command line) and then renamed onto the
//! target with `mv -f`, so a reader sees either the old file or the complete
//! new one. Concurrent writers only race at the rename; the last one wins.
//!
//! The rename replaces the target inode: permissions and ownership of the
//! previous file are not carried over, and a symlink target is replaced by a
//! regular file.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::listing::join_remote_path;
use super::mime::{content_type_for, file_name_of, file_type_of};
use super::quote::{shell_quote, validate_remote_path};
use crate::error::FinderError;
use crate::session::Session;
use crate::ssh::CommandResult;

/// A remote file as handed to the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub content: String,
    /// Final path segment
    pub file_name: String,
    /// Lower-cased extension, possibly empty
    pub file_type: String,
    pub content_type: String,
}

/// Read a remote file. Non-UTF-8 bytes are replaced with U+FFFD.
pub async fn read_file(session: &Session, path: &str) -> Result<FileContent, FinderError> {
    validate_remote_path(path)?;

    let result = session
        .execute(&format!("cat -- {}", shell_quote(path)))
        .await?;
    if !result.success() {
        return Err(FinderError::command_failed(
            "Failed to read file",
            diagnostic(&result),
        ));
    }

    let file_type = file_type_of(path);
    Ok(FileContent {
        content: result.stdout_text(),
        file_name: file_name_of(path).to_string(),
        content_type: content_type_for(&file_type).to_string(),
        file_type,
    })
}

/// Replace the remote file at `path` with `content`.
///
/// `staging_dir` overrides where the temp file is created; by default it sits
/// next to the target so the rename never crosses a filesystem boundary.
/// Whenever staging or relocation fails, timeouts included, the temp file is
/// removed on a best-effort basis.
pub async fn write_file(
    session: &Session,
    path: &str,
    content: &str,
    staging_dir: Option<&str>,
) -> Result<(), FinderError> {
    validate_remote_path(path)?;
    if let Some(dir) = staging_dir {
        validate_remote_path(dir)?;
    }
    if file_name_of(path).is_empty() {
        return Err(FinderError::Validation(format!(
            "Path does not name a file: {}",
            path
        )));
    }

    let temp_path = staging_path(path, staging_dir);
    let quoted_temp = shell_quote(&temp_path);

    let staged = session
        .execute_with_input(&format!("cat > {}", quoted_temp), content.as_bytes())
        .await;
    match staged {
        Ok(result) if result.success() => {}
        Ok(result) => {
            remove_quietly(session, &quoted_temp).await;
            return Err(FinderError::WriteStage {
                stderr: diagnostic(&result),
            });
        }
        Err(e) => {
            remove_quietly(session, &quoted_temp).await;
            return Err(e);
        }
    }
    debug!("Staged {} bytes at {}", content.len(), temp_path);

    let moved = session
        .execute(&relocate_command(&quoted_temp, &shell_quote(path)))
        .await;
    match moved {
        Ok(result) if result.success() => {}
        Ok(result) => {
            remove_quietly(session, &quoted_temp).await;
            return Err(FinderError::WriteRelocate {
                stderr: diagnostic(&result),
            });
        }
        Err(e) => {
            remove_quietly(session, &quoted_temp).await;
            return Err(e);
        }
    }

    info!("[session {}] Saved {}", session.id, path);
    Ok(())
}

/// Temp file location for a write to `target`
pub fn staging_path(target: &str, staging_dir: Option<&str>) -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    let suffix = hex::encode(bytes);

    match staging_dir {
        Some(dir) => join_remote_path(dir, &format!("sshfinder-edit-{}.tmp", suffix)),
        None => {
            let (parent, name) = match target.rsplit_once('/') {
                Some(("", name)) => ("/", name),
                Some((parent, name)) => (parent, name),
                None => (".", target),
            };
            join_remote_path(parent, &format!(".{}.sshfinder-{}.tmp", name, suffix))
        }
    }
}

/// `mv` would move the temp file *into* an existing directory, so refuse that case.
fn relocate_command(quoted_temp: &str, quoted_target: &str) -> String {
    format!(
        "if [ -d {target} ]; then echo 'Target is a directory' >&2; exit 1; fi; mv -f -- {temp} {target}",
        temp = quoted_temp,
        target = quoted_target
    )
}

async fn remove_quietly(session: &Session, quoted_temp: &str) {
    match session.execute(&format!("rm -f -- {}", quoted_temp)).await {
        Ok(result) if result.success() => {}
        Ok(result) => warn!("Failed to remove temp file: {}", result.stderr_text().trim()),
        Err(e) => warn!("Failed to remove temp file: {}", e),
    }
}

/// stderr, or the exit code when the command failed silently
fn diagnostic(result: &CommandResult) -> String {
    let stderr = result.stderr_text();
    if stderr.trim().is_empty() {
        format!("command exited with status {}", result.exit_code)
    } else {
        stderr
    }
}
