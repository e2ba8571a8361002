//! Per-connection worker.
//!
//! A worker loops over `receive → parse → dispatch → acknowledge` until the
//! peer closes the stream or a transport error occurs, then closes the
//! stream and gives its slot back. Errors end only the one connection.
//!
//! Output produced by `GET` and `EXEC` goes to the dispatcher's local
//! [`OutputSink`](crate::dispatch::OutputSink); the peer only ever receives
//! the acknowledgement.

mod ack;

use std::io::{self, Read, Write};

use tracing::{debug, info};

use crate::command::Command;
use crate::dispatch::CommandDispatcher;
use crate::slots::{ConnectionRecord, SlotLease};
use crate::transport::{ConnectionHandler, ConnectionStream};

pub use self::ack::ACK_CAPACITY;
pub(crate) use self::ack::compose_ack;

const WORKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::worker");

/// Serves the command protocol on admitted connections.
#[derive(Debug, Clone)]
pub struct ConnectionWorker {
    dispatcher: CommandDispatcher,
    buffer_size: usize,
}

impl ConnectionWorker {
    /// Builds a worker that receives at most `buffer_size` bytes per read.
    pub fn new(dispatcher: CommandDispatcher, buffer_size: usize) -> Self {
        Self {
            dispatcher,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Runs the receive loop on `stream` until it closes, returning the
    /// number of commands processed.
    pub fn serve<S: Read + Write>(&self, stream: &mut S, record: &ConnectionRecord) -> usize {
        let mut buffer = vec![0_u8; self.buffer_size];
        let mut processed = 0;
        loop {
            let received = match read_with_retry(stream, &mut buffer) {
                Ok(0) => {
                    debug!(target: WORKER_TARGET, slot = record.slot_index(), "peer closed");
                    break;
                }
                Ok(received) => received,
                Err(error) => {
                    debug!(
                        target: WORKER_TARGET,
                        slot = record.slot_index(),
                        %error,
                        "receive failed"
                    );
                    break;
                }
            };
            let raw = &buffer[..received];

            let command = Command::parse(raw);
            if let Some(output) = self.dispatcher.dispatch(&command) {
                self.dispatcher.sink().command_output(&output);
            }

            let ack = compose_ack(record.peer_label(), raw);
            if let Err(error) = stream.write_all(&ack).and_then(|()| stream.flush()) {
                debug!(
                    target: WORKER_TARGET,
                    slot = record.slot_index(),
                    %error,
                    "reply failed"
                );
                break;
            }
            processed += 1;
        }
        processed
    }
}

impl ConnectionHandler for ConnectionWorker {
    fn handle(&self, lease: SlotLease, mut stream: ConnectionStream) {
        info!(
            target: WORKER_TARGET,
            slot = lease.slot_index(),
            peer = lease.record().peer_label(),
            "connection opened"
        );
        let processed = self.serve(&mut stream, lease.record());
        stream.close();
        info!(
            target: WORKER_TARGET,
            slot = lease.slot_index(),
            processed,
            "connection closed"
        );
        drop(lease);
    }
}

fn read_with_retry<S: Read>(stream: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}
