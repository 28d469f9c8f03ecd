//! Per-connection protocol state machine.
//!
//! Drives one client from the initial CONNECT through PUT/GET/DELETE to
//! DISCONNECT (or a fatal error). The registry lock is held only around
//! in-memory lookups and mutations; every read and write on the stream
//! happens outside the critical section.
//!
//! Generic over the stream type so TLS or in-memory duplex streams can
//! stand in for plain TCP.

use std::io;

use bytes::BytesMut;
use cubby_core::{lock_registry, SharedRegistry, StoreError};
use cubby_protocol::{Command, FieldLimits, Response};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Per-connection limits derived from the server config.
#[derive(Debug, Clone, Copy)]
pub struct ConnLimits {
    /// Maximum bytes buffered while waiting for a line terminator.
    pub max_line_len: usize,
    /// Field lengths enforced by the tokenizer.
    pub fields: FieldLimits,
}

/// Removes the handler's session from the registry when dropped.
///
/// Every exit out of the connected state — clean DISCONNECT, peer EOF,
/// parse error, response write failure, even a panic in the handler —
/// must leave no session behind. Tying removal to `Drop` makes cleanup
/// a structural guarantee instead of a per-path obligation.
struct SessionGuard {
    registry: SharedRegistry,
    client_id: Option<String>,
}

impl SessionGuard {
    fn new(registry: SharedRegistry, client_id: String) -> Self {
        Self {
            registry,
            client_id: Some(client_id),
        }
    }

    /// Removes the session now instead of waiting for drop.
    fn release(&mut self) {
        if let Some(id) = self.client_id.take() {
            // NotFound is fine: nothing left to clean up
            let _ = lock_registry(&self.registry).remove(&id);
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// One read attempt's outcome.
enum ReadLine {
    /// A complete line, terminator (and any trailing `\r`) stripped.
    Line(String),
    /// End of stream — clean, or mid-line; either way the peer is gone.
    Eof,
    /// The line overflowed the buffer or wasn't valid UTF-8.
    Malformed,
}

/// Drives a single client connection to completion.
///
/// Returns `Ok(())` on every orderly close, including protocol
/// violations that silently terminate the connection; only transport
/// failures surface as errors for the accept loop to log. Whatever the
/// exit path, the client's session (if one was established) has been
/// removed from the registry by the time this returns.
pub async fn handle<S>(
    mut stream: S,
    registry: SharedRegistry,
    limits: ConnLimits,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(limits.max_line_len);
    let mut out = BytesMut::with_capacity(64);

    // await-connect phase: the first line must be a well-formed CONNECT
    let line = match read_line(&mut stream, &mut buf, limits.max_line_len).await? {
        ReadLine::Line(line) => line,
        ReadLine::Eof | ReadLine::Malformed => return Ok(()),
    };
    let client_id = match Command::parse(&line, &limits.fields) {
        Ok(Command::Connect { client_id }) => client_id,
        Ok(_) | Err(_) => {
            debug!("first line is not a valid CONNECT, closing");
            return Ok(());
        }
    };

    let inserted = lock_registry(&registry).insert(&client_id);
    // lock released; respond outside the critical section
    if let Err(e) = inserted {
        debug!(client_id = %client_id, error = %e, "CONNECT rejected");
        write_response(&mut stream, &mut out, &Response::ConnectError).await?;
        return Ok(());
    }

    // from here on the guard owns cleanup: if the CONNECT: OK write
    // below fails, the just-inserted session is removed on drop rather
    // than leaking an orphaned entry
    let mut session = SessionGuard::new(registry.clone(), client_id.clone());

    write_response(&mut stream, &mut out, &Response::ConnectOk).await?;
    debug!(client_id = %client_id, "session established");

    // connected phase: one command per line until DISCONNECT or a fatal error
    loop {
        let line = match read_line(&mut stream, &mut buf, limits.max_line_len).await? {
            ReadLine::Line(line) => line,
            ReadLine::Eof => return Ok(()),
            ReadLine::Malformed => {
                debug!(client_id = %client_id, "malformed line, closing");
                return Ok(());
            }
        };

        let command = match Command::parse(&line, &limits.fields) {
            Ok(command) => command,
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "protocol error, closing");
                return Ok(());
            }
        };

        let response = match command {
            Command::Disconnect => {
                session.release();
                write_response(&mut stream, &mut out, &Response::DisconnectOk).await?;
                debug!(client_id = %client_id, "session disconnected");
                return Ok(());
            }
            Command::Connect { .. } => {
                debug!(client_id = %client_id, "CONNECT on an established session, closing");
                return Ok(());
            }
            Command::Put { key, value } => {
                let result = lock_registry(&registry)
                    .find_mut(&client_id)
                    .map(|s| s.put(&key, &value));
                match result {
                    Some(Ok(())) => Response::PutOk,
                    // StoreFull: reply and keep the connection open
                    Some(Err(StoreError::StoreFull)) => Response::PutError,
                    Some(Err(StoreError::NotFound)) => Response::PutError,
                    None => return Ok(()),
                }
            }
            Command::Get { key } => {
                let value = lock_registry(&registry)
                    .find(&client_id)
                    .map(|s| s.get(&key).map(str::to_owned));
                match value {
                    Some(Some(v)) => Response::Value(v),
                    Some(None) => Response::GetError,
                    None => return Ok(()),
                }
            }
            Command::Delete { key } => {
                let result = lock_registry(&registry)
                    .find_mut(&client_id)
                    .map(|s| s.delete(&key));
                match result {
                    Some(Ok(())) => Response::DeleteOk,
                    Some(Err(_)) => Response::DeleteError,
                    None => return Ok(()),
                }
            }
        };

        write_response(&mut stream, &mut out, &response).await?;
    }
}

/// Reads one newline-terminated line into `buf`.
///
/// A `\r` directly before the `\n` is stripped along with it. Data after
/// the newline stays in `buf` for the next call.
async fn read_line<S>(
    stream: &mut S,
    buf: &mut BytesMut,
    max_line_len: usize,
) -> io::Result<ReadLine>
where
    S: AsyncRead + Unpin,
{
    loop {
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let mut line = buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            return Ok(match String::from_utf8(line.to_vec()) {
                Ok(s) => ReadLine::Line(s),
                Err(_) => ReadLine::Malformed,
            });
        }
        if buf.len() >= max_line_len {
            return Ok(ReadLine::Malformed);
        }
        if stream.read_buf(buf).await? == 0 {
            return Ok(ReadLine::Eof);
        }
    }
}

/// Serializes `response` and writes it out in one `write_all`.
async fn write_response<S>(
    stream: &mut S,
    out: &mut BytesMut,
    response: &Response,
) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    out.clear();
    response.encode(out);
    stream.write_all(out).await
}
