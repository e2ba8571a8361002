//! Accepted connections and the seam between the accept loop and workers.

use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, TcpStream};

use crate::slots::SlotLease;

/// A connection that won a slot and is handed to a worker.
#[derive(Debug)]
pub struct ConnectionStream {
    inner: TcpStream,
}

impl ConnectionStream {
    pub(crate) fn new(inner: TcpStream) -> Self {
        Self { inner }
    }

    /// Address of the remote peer, if the socket still reports one.
    pub fn peer_ip(&self) -> Option<IpAddr> {
        self.inner.peer_addr().ok().map(|addr| addr.ip())
    }

    /// Shuts down both directions and releases the socket.
    pub fn close(self) {
        // The peer may already be gone.
        let _ = self.inner.shutdown(Shutdown::Both);
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Serves one admitted connection on its own thread.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Runs the connection to completion. The slot is freed when `lease` is
    /// dropped, so implementations hold it until the stream is closed.
    fn handle(&self, lease: SlotLease, stream: ConnectionStream);
}
