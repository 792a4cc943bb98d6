//! Remote filesystem operations over plain shell commands
//!
//! Everything here runs through `Session::execute`; no SFTP subsystem or
//! remote helper is required on the host.

mod exec;
mod file;
mod listing;
mod mime;
mod quote;

pub use file::{read_file, staging_path, write_file, FileContent};
pub use listing::{join_remote_path, list_directory, listing_command, parse_listing, DirectoryEntry};
pub use mime::{content_type_for, file_name_of, file_type_of, DEFAULT_CONTENT_TYPE};
pub use quote::{shell_quote, validate_remote_path};
