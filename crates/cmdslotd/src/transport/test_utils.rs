//! Test helpers for the transport module.

use std::io::Read;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionHandler, ConnectionStream};
use crate::slots::SlotLease;

/// Counts admitted connections and keeps each slot occupied until the peer
/// hangs up.
pub(crate) struct HoldingHandler {
    count: Arc<AtomicUsize>,
}

impl HoldingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for HoldingHandler {
    fn handle(&self, lease: SlotLease, mut stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
        stream.close();
        drop(lease);
    }
}
