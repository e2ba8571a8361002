//! Command execution against external capabilities.
//!
//! The dispatcher never reports failure to its caller. Missing files,
//! unwritable destinations and commands that fail to start are logged and
//! otherwise absorbed, because the protocol has no channel for returning
//! errors to the peer.

mod capabilities;
mod dispatcher;
mod sink;

pub use self::capabilities::{
    FileReader, FileWriter, ProcessOutput, ProcessRunner, SystemFiles, SystemProcessRunner,
};
pub use self::dispatcher::{CommandDispatcher, RETRIEVE_CHUNK_BYTES};
pub use self::sink::{OutputSink, StdoutSink};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
