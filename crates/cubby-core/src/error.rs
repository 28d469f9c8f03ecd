//! Error types for registry and store operations.

use thiserror::Error;

/// Errors returned by session registry operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry already holds its configured maximum of sessions.
    #[error("session table is full")]
    CapacityExceeded,

    /// A live session already uses this client id.
    #[error("client id is already connected")]
    DuplicateId,

    /// No live session matches this client id.
    #[error("no session for that client id")]
    NotFound,
}

/// Errors returned by a session's key-value store.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The store already holds its configured maximum of entries and
    /// the key is not present (overwrites never hit this).
    #[error("store is at capacity")]
    StoreFull,

    /// The key is not present in the store.
    #[error("key not found")]
    NotFound,
}
