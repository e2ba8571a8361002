//! TCP listener and accept loop.
//!
//! The listener binds the configured address and accepts connections on a
//! background thread. Each accepted stream must win a slot in the
//! [`ConnectionSlotTable`](crate::slots::ConnectionSlotTable) before a worker
//! thread is spawned for it; streams that find the table full are closed
//! straight away.

mod errors;
mod listener;
mod stream;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::stream::{ConnectionHandler, ConnectionStream};
#[cfg(test)]
pub(crate) use self::test_utils::HoldingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
