//! Capped-length copies used wherever input flows into a fixed-size field.
//!
//! Oversized input is cut at the cap rather than rejected.

/// Returns the first `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Appends `bytes` to `buffer` without letting it grow past `capacity`.
pub(crate) fn extend_capped(buffer: &mut Vec<u8>, bytes: &[u8], capacity: usize) {
    let room = capacity.saturating_sub(buffer.len());
    buffer.extend_from_slice(&bytes[..bytes.len().min(room)]);
}
