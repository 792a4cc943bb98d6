//! SSHFinder core
//!
//! Browse and edit files on a host reachable only over SSH. Directory
//! listings, reads and writes are translated into plain shell commands run on
//! an exec channel, so the remote side needs nothing beyond a POSIX shell,
//! `ls`, `cat` and `mv`.
//!
//! Layers, bottom up:
//! - [`ssh`]: transport seam and the russh implementation
//! - [`session`]: registry of live sessions (one connection each)
//! - [`remote`]: command execution, listing parser, file read/write
//! - [`gateway`]: HTTP surface for the browser client

pub mod config;
pub mod error;
pub mod gateway;
pub mod remote;
pub mod session;
pub mod ssh;

pub use config::FinderConfig;
pub use error::FinderError;
pub use session::{Session, SessionRegistry};
