//! Server assembly: the slot table, the worker and the listener.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use cmdslot_config::Config;

use crate::dispatch::CommandDispatcher;
use crate::lifecycle::{LifecycleReporter, StructuredLifecycleReporter};
use crate::shutdown::{ShutdownError, ShutdownSignal, TerminationSignals};
use crate::slots::ConnectionSlotTable;
use crate::transport::{ListenerError, ListenerHandle, SocketListener};
use crate::worker::ConnectionWorker;

/// Errors that stop the server from starting or shutting down cleanly.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or running the listener failed.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// Waiting for a shutdown signal failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

/// A configured but not yet listening server.
///
/// The server owns its [`ConnectionSlotTable`]; the accept loop and every
/// worker share it through an `Arc`.
#[derive(Debug)]
pub struct Server {
    config: Config,
    slots: Arc<ConnectionSlotTable>,
    worker: Arc<ConnectionWorker>,
}

impl Server {
    /// Builds a server backed by the local filesystem, shell and stdout.
    pub fn new(config: Config) -> Self {
        Self::with_dispatcher(config, CommandDispatcher::system())
    }

    /// Builds a server that dispatches through `dispatcher`.
    pub fn with_dispatcher(config: Config, dispatcher: CommandDispatcher) -> Self {
        let slots = ConnectionSlotTable::new(config.max_connections());
        let worker = Arc::new(ConnectionWorker::new(dispatcher, config.buffer_size()));
        Self {
            config,
            slots,
            worker,
        }
    }

    /// Configuration the server was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Slot table shared with the accept loop and workers.
    pub fn slots(&self) -> &Arc<ConnectionSlotTable> {
        &self.slots
    }

    /// Binds the configured endpoint and starts accepting connections.
    ///
    /// # Errors
    ///
    /// Returns a [`ServerError`] when the address cannot be resolved or
    /// bound, or the accept thread cannot start.
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let listener = SocketListener::bind(self.config.listen())?;
        let local_addr = listener.local_addr();
        let listener = listener.start(Arc::clone(&self.slots), self.worker)?;
        Ok(ServerHandle {
            listener,
            slots: self.slots,
            local_addr,
        })
    }
}

/// Handle to a running server.
#[derive(Debug)]
pub struct ServerHandle {
    listener: ListenerHandle,
    slots: Arc<ConnectionSlotTable>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    /// Address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Slot table of the running server.
    pub fn slots(&self) -> &Arc<ConnectionSlotTable> {
        &self.slots
    }

    /// Stops accepting and waits for the accept loop to exit. Workers that
    /// are already running continue until their peers disconnect.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Listener`] if the accept thread panicked.
    pub fn stop(self) -> Result<(), ServerError> {
        self.listener.shutdown();
        self.listener.join().map_err(ServerError::from)
    }
}

/// Runs a server until `shutdown` fires, reporting progress to `reporter`.
///
/// # Errors
///
/// Returns a [`ServerError`] when startup fails, the shutdown signal cannot
/// be awaited, or the accept loop panicked.
pub fn run_with(
    config: Config,
    shutdown: &dyn ShutdownSignal,
    reporter: &dyn LifecycleReporter,
) -> Result<(), ServerError> {
    reporter.starting(&config);
    let handle = match Server::new(config.clone()).start() {
        Ok(handle) => handle,
        Err(error) => {
            reporter.failed(&error);
            return Err(error);
        }
    };
    reporter.listening(&config, handle.local_addr());

    let waited = shutdown.wait();
    if let Ok(cause) = &waited {
        reporter.stopping(*cause);
    }
    let stopped = handle.stop();
    let result = waited.map(drop).map_err(ServerError::from).and(stopped);
    match &result {
        Ok(()) => reporter.stopped(),
        Err(error) => reporter.failed(error),
    }
    result
}

/// Runs a server until the process receives `SIGTERM` or `SIGINT`.
///
/// # Errors
///
/// See [`run_with`].
pub fn start_server(config: Config) -> Result<(), ServerError> {
    run_with(config, &TerminationSignals, &StructuredLifecycleReporter)
}
