//! Parse errors for the line protocol.

use thiserror::Error;

/// Errors produced when tokenizing one protocol line.
///
/// Every variant is connection-fatal for the client that sent the line:
/// the handler closes the transport without a response rather than
/// guessing at intent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line was empty after stripping the terminator.
    #[error("empty command line")]
    Empty,

    /// The first token is not a known command name.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// A known command arrived with the wrong number of tokens.
    #[error("{command} expects {expected}")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
    },

    /// A field exceeded its configured maximum length. Fields are
    /// rejected outright, never truncated.
    #[error("{field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The line contained bytes outside the ASCII range.
    #[error("line contains non-ASCII bytes")]
    NonAscii,
}
