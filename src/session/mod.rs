//! Session management
//!
//! A session binds one opaque id to one live SSH connection. The registry
//! owns every session; callers only ever hold `Arc<Session>` clones for the
//! duration of a request.

mod registry;
mod types;

pub use registry::{SessionRegistry, FALLBACK_HOME};
pub use types::Session;
