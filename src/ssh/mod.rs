//! SSH transport
//!
//! `transport` defines the seam the rest of the crate programs against;
//! `client` is the russh implementation used in production.

mod client;
mod transport;

pub use client::{ClientHandler, RusshConnection, RusshConnector};
pub use transport::{
    AuthMethod, CommandResult, ConnectParams, Connector, RemoteConnection, TransportError,
};
