//! Connection-slotted command server.
//!
//! `cmdslotd` accepts stream connections, admits each one into a fixed-size
//! [`ConnectionSlotTable`], and serves a small text protocol on a dedicated
//! worker thread per connection:
//!
//! ```text
//! GET <path>            read <path> and emit it to the local output sink
//! PUT <path> <body>     overwrite <path> with <body>
//! EXEC <command-line>   run <command-line>, capturing output to the local sink
//! ```
//!
//! Every record is answered with an acknowledgement that echoes the peer
//! label and the record. Retrieved file contents and captured process output
//! stay on the server; they are never sent back to the peer.
//!
//! Connections beyond the configured capacity are closed as soon as they are
//! accepted. A worker keeps its slot until its peer disconnects, at which
//! point the slot becomes available to the next connection.

mod bounded;
pub mod command;
pub mod dispatch;
pub mod lifecycle;
mod server;
pub mod shutdown;
pub mod slots;
pub mod telemetry;
pub mod transport;
pub mod worker;

pub use command::{Command, CommandKind};
pub use dispatch::CommandDispatcher;
pub use lifecycle::{LifecycleReporter, StructuredLifecycleReporter};
pub use server::{Server, ServerError, ServerHandle, run_with, start_server};
pub use slots::{ConnectionRecord, ConnectionSlotTable, SlotError, SlotLease};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use worker::ConnectionWorker;

#[cfg(test)]
mod tests;
