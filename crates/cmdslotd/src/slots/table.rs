//! Slot table implementation.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::{SLOTS_TARGET, SlotError};

/// Metadata describing the connection that occupies a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    slot_index: usize,
    name: String,
    peer_label: String,
}

impl ConnectionRecord {
    fn new(slot_index: usize, peer: Option<IpAddr>) -> Self {
        let name = format!("client_{slot_index}");
        let peer_label = peer.map_or_else(|| name.clone(), |addr| addr.to_string());
        Self {
            slot_index,
            name,
            peer_label,
        }
    }

    /// Index of the slot, stable while the record is active.
    pub fn slot_index(&self) -> usize {
        self.slot_index
    }

    /// Generated name, `client_<slot>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label used in replies: the peer address, or the generated name when
    /// the socket could not report one.
    pub fn peer_label(&self) -> &str {
        &self.peer_label
    }
}

#[derive(Debug)]
struct SlotState {
    slots: Vec<Option<ConnectionRecord>>,
    active_count: usize,
}

/// Registry mapping slot index to the connection occupying it.
///
/// All reads and writes go through a single mutex. No operation performs I/O
/// while holding it, so contention is bounded by an O(capacity) scan.
#[derive(Debug)]
pub struct ConnectionSlotTable {
    state: Mutex<SlotState>,
}

impl ConnectionSlotTable {
    /// Builds a table with `capacity` free slots.
    #[must_use]
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState {
                slots: vec![None; capacity],
                active_count: 0,
            }),
        })
    }

    /// Claims the lowest-indexed free slot for a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::Full`] when every slot is occupied; the table is
    /// left unchanged.
    pub fn try_allocate(self: &Arc<Self>, peer: Option<IpAddr>) -> Result<SlotLease, SlotError> {
        let record = {
            let mut state = self.lock();
            let capacity = state.slots.len();
            let Some(slot_index) = state.slots.iter().position(Option::is_none) else {
                return Err(SlotError::Full { capacity });
            };
            let record = ConnectionRecord::new(slot_index, peer);
            state.slots[slot_index] = Some(record.clone());
            state.active_count += 1;
            record
        };
        debug!(
            target: SLOTS_TARGET,
            slot = record.slot_index(),
            peer = record.peer_label(),
            "slot allocated"
        );
        Ok(SlotLease {
            table: Arc::clone(self),
            record,
        })
    }

    /// Marks a slot as free again.
    ///
    /// Workers normally release through [`SlotLease`]; calling this directly
    /// for a slot that is still leased will cause the lease's own release to
    /// fail.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::NotActive`] for a double release and
    /// [`SlotError::OutOfRange`] for an index beyond the capacity. Neither
    /// changes the active count.
    pub fn release(&self, slot_index: usize) -> Result<(), SlotError> {
        let mut state = self.lock();
        let capacity = state.slots.len();
        let slot = state
            .slots
            .get_mut(slot_index)
            .ok_or(SlotError::OutOfRange {
                slot: slot_index,
                capacity,
            })?;
        if slot.take().is_none() {
            return Err(SlotError::NotActive { slot: slot_index });
        }
        state.active_count -= 1;
        Ok(())
    }

    /// Number of occupied slots.
    pub fn active_count(&self) -> usize {
        self.lock().active_count
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Snapshot of the record occupying `slot_index`, if any.
    pub fn record(&self, slot_index: usize) -> Option<ConnectionRecord> {
        self.lock().slots.get(slot_index).cloned().flatten()
    }

    /// Snapshot of every active record in slot order.
    pub fn active_records(&self) -> Vec<ConnectionRecord> {
        self.lock().slots.iter().flatten().cloned().collect()
    }

    // Every mutation completes under a single guard, so a panic elsewhere
    // cannot leave the state half-written and the poison flag can be ignored.
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive claim on one slot, released when dropped.
#[derive(Debug)]
pub struct SlotLease {
    table: Arc<ConnectionSlotTable>,
    record: ConnectionRecord,
}

impl SlotLease {
    /// Record describing the leased slot.
    pub fn record(&self) -> &ConnectionRecord {
        &self.record
    }

    /// Index of the leased slot.
    pub fn slot_index(&self) -> usize {
        self.record.slot_index
    }
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        match self.table.release(self.record.slot_index) {
            Ok(()) => debug!(
                target: SLOTS_TARGET,
                slot = self.record.slot_index,
                "slot released"
            ),
            Err(error) => warn!(
                target: SLOTS_TARGET,
                %error,
                "slot lease released an inactive slot"
            ),
        }
    }
}
