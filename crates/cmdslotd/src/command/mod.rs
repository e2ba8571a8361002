//! Text command protocol.
//!
//! Each received record carries one command: a keyword followed by an
//! argument tail.
//!
//! ```text
//! GET <path>
//! PUT <path> <body>
//! EXEC <command-line>
//! ```
//!
//! Keywords are case-sensitive. Anything else parses as
//! [`CommandKind::Unknown`] and is ignored by the dispatcher.

mod parser;

use std::fmt;

pub use self::parser::{MAX_ARGUMENT_CHARS, MAX_KEYWORD_CHARS};

/// Dispatch category derived from a record's leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `GET`: read a file and emit it to the local sink.
    Retrieve,
    /// `PUT`: overwrite a file with the supplied body.
    Store,
    /// `EXEC`: run a command line and capture its output.
    Run,
    /// Any other keyword, or none at all.
    Unknown,
}

impl CommandKind {
    /// Maps a protocol keyword to its kind.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "GET" => Self::Retrieve,
            "PUT" => Self::Store,
            "EXEC" => Self::Run,
            _ => Self::Unknown,
        }
    }

    /// Stable lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Store => "store",
            Self::Run => "run",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A parsed command record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    keyword: String,
    argument: String,
}

impl Command {
    /// Builds a command directly from its parts, applying the same length
    /// caps as [`Command::parse`].
    pub fn new(kind: CommandKind, argument: impl AsRef<str>) -> Self {
        let keyword = match kind {
            CommandKind::Retrieve => "GET",
            CommandKind::Store => "PUT",
            CommandKind::Run => "EXEC",
            CommandKind::Unknown => "",
        };
        Self::from_parts(keyword, argument.as_ref())
    }

    /// Parses a raw record received from a peer.
    pub fn parse(record: &[u8]) -> Self {
        parser::parse(record)
    }

    pub(crate) fn from_parts(keyword: &str, argument: &str) -> Self {
        let keyword = crate::bounded::truncate_chars(keyword, MAX_KEYWORD_CHARS);
        Self {
            kind: CommandKind::from_keyword(keyword),
            keyword: keyword.to_string(),
            argument: crate::bounded::truncate_chars(argument, MAX_ARGUMENT_CHARS).to_string(),
        }
    }

    /// The dispatch category.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The leading token as received, after truncation.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Everything after the keyword and its separating whitespace.
    pub fn argument(&self) -> &str {
        &self.argument
    }
}
