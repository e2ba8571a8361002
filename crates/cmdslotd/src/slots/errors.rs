//! Error types for slot allocation and release.

use thiserror::Error;

/// Errors surfaced by [`super::ConnectionSlotTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    /// Every slot is occupied.
    #[error("all {capacity} connection slots are in use")]
    Full { capacity: usize },
    /// The slot was released while it was not active.
    #[error("connection slot {slot} is not active")]
    NotActive { slot: usize },
    /// The slot index lies outside the table.
    #[error("connection slot {slot} is out of range for capacity {capacity}")]
    OutOfRange { slot: usize, capacity: usize },
}
