//! cubby-protocol: the line-based wire protocol.
//!
//! One request per newline-terminated ASCII line, one response line per
//! request. Parsing produces a typed [`Command`] or a typed [`ParseError`];
//! responses serialize straight into a `BytesMut`.
//!
//! # quick start
//!
//! ```
//! use bytes::BytesMut;
//! use cubby_protocol::{Command, FieldLimits, Response};
//!
//! let cmd = Command::parse("PUT age 30", &FieldLimits::default()).unwrap();
//! assert_eq!(
//!     cmd,
//!     Command::Put {
//!         key: "age".into(),
//!         value: "30".into()
//!     }
//! );
//!
//! let mut buf = BytesMut::new();
//! Response::PutOk.encode(&mut buf);
//! assert_eq!(&buf[..], b"PUT: OK\n");
//! ```

pub mod command;
pub mod error;
pub mod response;

pub use command::{Command, FieldLimits};
pub use error::ParseError;
pub use response::Response;
