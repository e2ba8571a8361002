//! TCP accept loop.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use cmdslot_config::ListenAddress;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};
use crate::slots::ConnectionSlotTable;

/// Sleep between polls of the non-blocking socket when nothing is pending.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A bound TCP socket that is not accepting yet.
#[derive(Debug)]
pub struct SocketListener {
    address: ListenAddress,
    socket: TcpListener,
    local_addr: SocketAddr,
}

impl SocketListener {
    /// Resolves `address` and binds the first socket address it yields.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the host does not resolve or the
    /// port cannot be bound.
    pub fn bind(address: &ListenAddress) -> Result<Self, ListenerError> {
        let addr = resolve(address)?;
        let socket =
            TcpListener::bind(addr).map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;
        Ok(Self {
            address: address.clone(),
            socket,
            local_addr,
        })
    }

    /// Address actually bound, with the port chosen by the system when the
    /// configured port was `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address as configured.
    pub fn address(&self) -> &ListenAddress {
        &self.address
    }

    /// Starts accepting on a background thread. Each accepted connection
    /// must win a slot in `slots` before `handler` runs it on a thread of
    /// its own.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the socket cannot be made
    /// non-blocking or the accept thread cannot be spawned.
    pub fn start(
        self,
        slots: Arc<ConnectionSlotTable>,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.socket
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let stop = Arc::new(AtomicBool::new(false));
        let accept_loop = AcceptLoop {
            listener: self,
            stop: Arc::clone(&stop),
            slots,
            handler,
        };
        let thread = thread::Builder::new()
            .name("cmdslot-accept".to_string())
            .spawn(move || accept_loop.run())
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            stop,
            thread: Some(thread),
        })
    }
}

/// Handle to the background accept thread.
///
/// Dropping the handle stops accepting without waiting for the thread.
#[derive(Debug)]
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop. Running workers are not interrupted.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::AcceptThreadPanicked`] if the thread
    /// panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| ListenerError::AcceptThreadPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn resolve(address: &ListenAddress) -> Result<SocketAddr, ListenerError> {
    (address.host(), address.port())
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            address: address.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::Unresolved {
            address: address.to_string(),
        })
}

struct AcceptLoop {
    listener: SocketListener,
    stop: Arc<AtomicBool>,
    slots: Arc<ConnectionSlotTable>,
    handler: Arc<dyn ConnectionHandler>,
}

impl AcceptLoop {
    fn run(self) {
        let local_addr = self.listener.local_addr;
        info!(
            target: LISTENER_TARGET,
            address = %local_addr,
            capacity = self.slots.capacity(),
            "accepting connections"
        );
        // Consecutive failures of the same kind are logged once.
        let mut last_failure = None::<io::ErrorKind>;
        while !self.stop.load(Ordering::SeqCst) {
            match self.listener.socket.accept() {
                Ok((stream, _)) => {
                    last_failure = None;
                    self.admit(stream);
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(error) => {
                    if last_failure != Some(error.kind()) {
                        warn!(target: LISTENER_TARGET, %error, "accept failed, retrying");
                    }
                    last_failure = Some(error.kind());
                }
            }
        }
        info!(target: LISTENER_TARGET, address = %local_addr, "stopped accepting connections");
    }

    fn admit(&self, stream: TcpStream) {
        // Accepted sockets inherit non-blocking mode on some platforms.
        if let Err(error) = stream.set_nonblocking(false) {
            warn!(target: LISTENER_TARGET, %error, "dropping connection that cannot block");
            return;
        }
        let stream = ConnectionStream::new(stream);
        let lease = match self.slots.try_allocate(stream.peer_ip()) {
            Ok(lease) => lease,
            Err(error) => {
                info!(target: LISTENER_TARGET, %error, "rejecting connection");
                stream.close();
                return;
            }
        };
        let slot = lease.slot_index();
        debug!(
            target: LISTENER_TARGET,
            slot,
            peer = lease.record().peer_label(),
            "connection admitted"
        );
        let handler = Arc::clone(&self.handler);
        // A failed spawn drops the closure, closing the stream and freeing
        // the slot.
        if let Err(error) = thread::Builder::new()
            .name(format!("cmdslot-slot-{slot}"))
            .spawn(move || handler.handle(lease, stream))
        {
            warn!(
                target: LISTENER_TARGET,
                slot,
                %error,
                "failed to spawn connection worker"
            );
        }
    }
}
