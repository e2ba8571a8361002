//! Failures raised while setting up or tearing down the accept loop.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that keep the server from accepting connections.
///
/// Failures on individual accepted connections never surface here; they end
/// only that connection.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured host could not be resolved.
    #[error("cannot resolve listen address {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no usable address.
    #[error("listen address {address} resolved to nothing")]
    Unresolved { address: String },
    /// The port is taken or the interface is unavailable.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The bound socket could not be polled without blocking.
    #[error("cannot poll the listening socket: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    /// The operating system refused to start the accept thread.
    #[error("cannot start the accept thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked before it could be joined.
    #[error("accept thread panicked")]
    AcceptThreadPanicked,
}
