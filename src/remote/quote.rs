//! Shell quoting for remote command lines
//!
//! Paths are the only untrusted values ever placed into a command line; file
//! content travels on stdin. Every path goes through `validate_remote_path`
//! and then `shell_quote`.

use crate::error::FinderError;

/// Quote `value` for a POSIX shell.
///
/// Safe strings pass through untouched; anything else is wrapped in single
/// quotes with embedded `'` rewritten as `'\''`.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '+' | ','))
    {
        return value.to_string();
    }

    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Reject paths that cannot be passed safely to the remote shell.
///
/// Empty paths and any control character (NUL, newline, escape, ...) are refused
/// before a command is ever built.
pub fn validate_remote_path(path: &str) -> Result<(), FinderError> {
    if path.is_empty() {
        return Err(FinderError::Validation("Path is required".to_string()));
    }
    if let Some(c) = path.chars().find(|c| c.is_control()) {
        return Err(FinderError::Validation(format!(
            "Path contains control character U+{:04X}",
            c as u32
        )));
    }
    Ok(())
}
