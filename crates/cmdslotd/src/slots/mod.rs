//! Fixed-capacity registry of active connections.
//!
//! Every accepted connection occupies one slot for as long as its worker
//! runs. The table enforces the connection limit: allocation fails once all
//! slots are taken, and the worker's [`SlotLease`] hands the slot back when
//! it is dropped.

mod errors;
mod table;

pub use self::errors::SlotError;
pub use self::table::{ConnectionRecord, ConnectionSlotTable, SlotLease};

const SLOTS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::slots");
