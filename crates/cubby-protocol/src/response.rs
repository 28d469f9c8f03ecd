//! Server response lines.
//!
//! Each request gets exactly one response line. The reply strings are
//! fixed except for a successful GET, which echoes the stored value
//! verbatim. Every response is newline-terminated so the reply stream
//! can be consumed with the same line discipline as the request stream.

use bytes::BytesMut;

/// A single response line, written verbatim to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ConnectOk,
    ConnectError,
    PutOk,
    PutError,
    /// Successful GET: the stored value, unadorned.
    Value(String),
    GetError,
    DeleteOk,
    DeleteError,
    DisconnectOk,
}

impl Response {
    /// Appends the newline-terminated response line to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            Response::ConnectOk => buf.extend_from_slice(b"CONNECT: OK\n"),
            Response::ConnectError => buf.extend_from_slice(b"CONNECT: ERROR\n"),
            Response::PutOk => buf.extend_from_slice(b"PUT: OK\n"),
            Response::PutError => buf.extend_from_slice(b"PUT: ERROR\n"),
            Response::Value(value) => {
                buf.extend_from_slice(value.as_bytes());
                buf.extend_from_slice(b"\n");
            }
            Response::GetError => buf.extend_from_slice(b"GET: ERROR\n"),
            Response::DeleteOk => buf.extend_from_slice(b"DELETE: OK\n"),
            Response::DeleteError => buf.extend_from_slice(b"DELETE: ERROR\n"),
            Response::DisconnectOk => buf.extend_from_slice(b"DISCONNECT: OK\n"),
        }
    }
}
