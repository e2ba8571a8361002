//! Acknowledgement sent to the peer after every command.

use crate::bounded::extend_capped;

/// Longest acknowledgement sent to a peer, in bytes.
pub const ACK_CAPACITY: usize = 255;

const ACK_PREFIX: &[u8] = b"Processed command from ";

/// Builds `Processed command from <peer>: <record>`, cut to
/// [`ACK_CAPACITY`] bytes. The record is copied verbatim, terminator
/// included.
pub(crate) fn compose_ack(peer_label: &str, record: &[u8]) -> Vec<u8> {
    let mut ack = Vec::with_capacity(ACK_CAPACITY);
    extend_capped(&mut ack, ACK_PREFIX, ACK_CAPACITY);
    extend_capped(&mut ack, peer_label.as_bytes(), ACK_CAPACITY);
    extend_capped(&mut ack, b": ", ACK_CAPACITY);
    extend_capped(&mut ack, record, ACK_CAPACITY);
    ack
}
