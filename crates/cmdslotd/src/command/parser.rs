//! Splits a raw record into keyword and argument.

use super::Command;

/// Longest keyword kept from a record, in characters.
pub const MAX_KEYWORD_CHARS: usize = 255;

/// Longest argument kept from a record, in characters.
pub const MAX_ARGUMENT_CHARS: usize = 511;

pub(super) fn parse(record: &[u8]) -> Command {
    let text = String::from_utf8_lossy(record);
    let line = strip_line_terminator(&text).trim_start();
    let (keyword, argument) = match line.find(char::is_whitespace) {
        Some(split) => (&line[..split], line[split..].trim_start()),
        None => (line, ""),
    };
    Command::from_parts(keyword, argument)
}

fn strip_line_terminator(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}
