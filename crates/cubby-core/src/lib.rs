//! cubby-core: in-memory session state.
//!
//! Owns the bounded session registry and each session's bounded
//! key-value store. The registry is shared across connection handlers
//! behind a single coarse mutex — the only synchronization discipline in
//! the system. Critical sections are pure in-memory mutation; callers
//! must never hold the lock across I/O.

pub mod error;
pub mod registry;
pub mod session;

pub use error::{RegistryError, StoreError};
pub use registry::{lock_registry, SessionRegistry, SharedRegistry};
pub use session::{Entry, Session};
