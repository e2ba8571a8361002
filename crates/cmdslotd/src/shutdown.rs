//! Waiting for the request to stop accepting connections.

use std::ffi::c_int;
use std::fmt;
use std::io;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;

/// Signals that stop the accept loop.
const TERMINATION_SIGNALS: [c_int; 2] = [SIGTERM, SIGINT];

/// Why the server is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// A termination signal arrived.
    Signal(&'static str),
    /// The embedding code asked the server to stop.
    Requested,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(name) => formatter.write_str(name),
            Self::Requested => formatter.write_str("requested"),
        }
    }
}

/// Source of the decision to stop serving.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until the server should stop and reports why.
    fn wait(&self) -> Result<ShutdownCause, ShutdownError>;
}

/// The termination signal handlers could not be registered.
#[derive(Debug, Error)]
#[error("cannot listen for termination signals: {source}")]
pub struct ShutdownError {
    #[source]
    source: io::Error,
}

/// Blocks until the process receives `SIGTERM` or `SIGINT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminationSignals;

impl ShutdownSignal for TerminationSignals {
    fn wait(&self) -> Result<ShutdownCause, ShutdownError> {
        let mut signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError { source })?;
        Ok(signals
            .forever()
            .next()
            .map_or(ShutdownCause::Requested, |signal| {
                ShutdownCause::Signal(signal_name(signal))
            }))
    }
}

fn signal_name(signal: c_int) -> &'static str {
    match signal {
        SIGTERM => "SIGTERM",
        SIGINT => "SIGINT",
        _ => "signal",
    }
}
