//! Listing Parser
//!
//! Directory contents are obtained by running `ls -l` (or `ls -la`) remotely
//! and scraping its long format:
//!
//! ```text
//! drwxr-xr-x 2 alice staff 4096 Oct 18 11:46 my docs
//! ^type      ^links ^owner ^group ^size ^month ^day ^time/year ^name (rest of line)
//! ```
//!
//! Eight columns are consumed and the remainder of the line is taken verbatim
//! as the name, so names containing spaces survive.
//!
//! The operand is always `<path>/.`: a symlinked directory is followed, and a
//! path naming a regular file fails with "Not a directory" instead of being
//! listed as itself.
//!
//! # Known limitations
//! - A name containing a newline is split across two lines. The first half is
//!   mis-parsed and the second half dropped; it cannot be represented.
//! - Owner or group names containing spaces shift the columns and the line is
//!   misread.
//! - Output depends on the remote `ls`; `LC_ALL=C` pins the date columns but an
//!   exotic `ls` may still produce lines that are dropped here.
//! - A symlink name is cut at its first ` -> `, so a link whose own name
//!   contains ` -> ` is reported with a truncated name.
//!
//! A structured directory-read primitive would avoid all of the above.

use serde::Serialize;
use tracing::debug;

use super::quote::{shell_quote, validate_remote_path};
use crate::error::FinderError;
use crate::session::Session;

/// One parsed listing line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// Final path segment, no separators
    pub name: String,
    pub is_directory: bool,
    /// `parent` joined with `name`, repeated separators collapsed
    pub path: String,
}

/// Build the listing command for `path`
pub fn listing_command(path: &str, include_hidden: bool) -> String {
    let flags = if include_hidden { "-la" } else { "-l" };
    let operand = format!("{}/.", path.trim_end_matches('/'));
    format!("LC_ALL=C ls {} -- {}", flags, shell_quote(&operand))
}

/// List `path` on the remote host, in the order `ls` produced.
pub async fn list_directory(
    session: &Session,
    path: &str,
    include_hidden: bool,
) -> Result<Vec<DirectoryEntry>, FinderError> {
    validate_remote_path(path)?;

    let result = session
        .execute(&listing_command(path, include_hidden))
        .await?;
    if !result.success() {
        return Err(FinderError::command_failed(
            "Command failed",
            result.stderr_text(),
        ));
    }

    let entries = parse_listing(&result.stdout_text(), path);
    debug!("Found {} entries in {}", entries.len(), path);
    Ok(entries)
}

/// Parse long-format listing output. Lines that do not match are dropped.
pub fn parse_listing(output: &str, parent: &str) -> Vec<DirectoryEntry> {
    output
        .lines()
        .filter_map(parse_line)
        .filter(|(name, _)| name != "." && name != ".." && !name.contains('/'))
        .map(|(name, is_directory)| DirectoryEntry {
            path: join_remote_path(parent, &name),
            name,
            is_directory,
        })
        .collect()
}

/// Join a parent path and a name, collapsing runs of `/`.
pub fn join_remote_path(parent: &str, name: &str) -> String {
    let joined = format!("{}/{}", parent, name);
    let mut out = String::with_capacity(joined.len());
    let mut prev_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}

/// Returns `(name, is_directory)`
fn parse_line(line: &str) -> Option<(String, bool)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.starts_with("total ") {
        return None;
    }

    let mut rest = line;

    let mode = next_field(&mut rest)?;
    if mode.chars().count() < 10 {
        return None;
    }
    let kind = mode.chars().next()?;
    if !matches!(kind, '-' | 'd' | 'l' | 'b' | 'c' | 'p' | 's' | 'D') {
        return None;
    }

    next_field(&mut rest)?.parse::<u64>().ok()?; // links
    next_field(&mut rest)?; // owner
    next_field(&mut rest)?; // group

    let size = next_field(&mut rest)?;
    if matches!(kind, 'b' | 'c') && size.ends_with(',') {
        // "major, minor"
        next_field(&mut rest)?;
    } else if !size.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    next_field(&mut rest)?; // month
    next_field(&mut rest)?.parse::<u8>().ok()?; // day
    let time_or_year = next_field(&mut rest)?;
    if !time_or_year.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }

    let name = rest.strip_prefix(' ')?;
    let name = if kind == 'l' {
        name.split_once(" -> ").map_or(name, |(link, _)| link)
    } else {
        name
    };
    if name.is_empty() {
        return None;
    }

    Some((name.to_string(), kind == 'd'))
}

const SEPARATORS: &[char] = &[' ', '\t'];

/// Pop the next whitespace-delimited field, leaving the separator in `rest`.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start_matches(SEPARATORS);
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(SEPARATORS).unwrap_or(trimmed.len());
    let (field, remainder) = trimmed.split_at(end);
    *rest = remainder;
    Some(field)
}
