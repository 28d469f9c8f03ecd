//! Command parsing for the line protocol.
//!
//! Converts one received line (newline and carriage return already
//! stripped) into a typed [`Command`]. Tokens split on single spaces.
//! The PUT value is the remainder of the line after the second space and
//! may itself contain spaces; every other argument is a single token.
//!
//! Command names are case-sensitive, matching the reference server.

use crate::error::ParseError;

/// Default maximum client id length in bytes.
pub const DEFAULT_MAX_CLIENT_ID_LEN: usize = 10;
/// Default maximum key length in bytes.
pub const DEFAULT_MAX_KEY_LEN: usize = 10;
/// Default maximum value length in bytes. A 256-byte line carrying a
/// maximal `PUT <key> <value>` leaves 233 bytes for the value once the
/// command word, two separators, a 10-byte key, and the `\r\n` are
/// accounted for.
pub const DEFAULT_MAX_VALUE_LEN: usize = 233;

/// Maximum lengths for the protocol's bounded fields.
///
/// Limits are inclusive maxima: a field longer than its limit is a
/// [`ParseError::FieldTooLong`], never silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub max_client_id_len: usize,
    pub max_key_len: usize,
    pub max_value_len: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_client_id_len: DEFAULT_MAX_CLIENT_ID_LEN,
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        }
    }
}

/// A parsed client command, ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// CONNECT <client_id>. Opens a session under a unique client id.
    Connect { client_id: String },

    /// PUT <key> <value...>. Stores or overwrites one entry; the value
    /// may contain spaces.
    Put { key: String, value: String },

    /// GET <key>. Returns the stored value or an error reply.
    Get { key: String },

    /// DELETE <key>. Removes one entry.
    Delete { key: String },

    /// DISCONNECT. Ends the session cleanly.
    Disconnect,
}

impl Command {
    /// Parses one line into a [`Command`], enforcing `limits` on every
    /// field copy.
    ///
    /// Arity rules: `DISCONNECT` takes no argument, `CONNECT`/`GET`/
    /// `DELETE` take exactly one space-free argument, and `PUT` takes a
    /// key plus a value that runs to the end of the line.
    pub fn parse(line: &str, limits: &FieldLimits) -> Result<Command, ParseError> {
        if !line.is_ascii() {
            return Err(ParseError::NonAscii);
        }
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let (name, rest) = match line.split_once(' ') {
            Some((name, rest)) => (name, Some(rest)),
            None => (line, None),
        };

        match name {
            "DISCONNECT" => match rest {
                None => Ok(Command::Disconnect),
                Some(_) => Err(ParseError::WrongArity {
                    command: "DISCONNECT",
                    expected: "no arguments",
                }),
            },
            "CONNECT" => {
                let id = single_token(rest, "CONNECT", "exactly one client id")?;
                check_len(id, "client id", limits.max_client_id_len)?;
                Ok(Command::Connect {
                    client_id: id.to_string(),
                })
            }
            "GET" => {
                let key = single_token(rest, "GET", "exactly one key")?;
                check_len(key, "key", limits.max_key_len)?;
                Ok(Command::Get {
                    key: key.to_string(),
                })
            }
            "DELETE" => {
                let key = single_token(rest, "DELETE", "exactly one key")?;
                check_len(key, "key", limits.max_key_len)?;
                Ok(Command::Delete {
                    key: key.to_string(),
                })
            }
            "PUT" => {
                let rest = rest.ok_or(ParseError::WrongArity {
                    command: "PUT",
                    expected: "a key and a value",
                })?;
                let (key, value) = rest.split_once(' ').ok_or(ParseError::WrongArity {
                    command: "PUT",
                    expected: "a key and a value",
                })?;
                if key.is_empty() {
                    return Err(ParseError::WrongArity {
                        command: "PUT",
                        expected: "a key and a value",
                    });
                }
                check_len(key, "key", limits.max_key_len)?;
                check_len(value, "value", limits.max_value_len)?;
                Ok(Command::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Extracts a one-argument command's single token: present, non-empty,
/// and containing no further spaces.
fn single_token<'a>(
    rest: Option<&'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, ParseError> {
    match rest {
        Some(token) if !token.is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(ParseError::WrongArity { command, expected }),
    }
}

fn check_len(field: &str, name: &'static str, max: usize) -> Result<(), ParseError> {
    if field.len() > max {
        return Err(ParseError::FieldTooLong {
            field: name,
            len: field.len(),
            max,
        });
    }
    Ok(())
}
