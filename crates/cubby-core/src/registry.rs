//! The shared session table.
//!
//! A bounded, densely packed collection of live sessions keyed by
//! client id. All access goes through one process-wide mutex (the
//! Concurrency Guard): operations across different clients serialize
//! against each other, a deliberate simplicity trade-off. The critical
//! sections are tiny in-memory mutations, so a `std::sync::Mutex` is
//! the right tool even under an async runtime — the lock is never held
//! across an await point.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RegistryError;
use crate::session::Session;

/// The process-wide registry handle shared by all connection handlers.
pub type SharedRegistry = Arc<Mutex<SessionRegistry>>;

/// Locks a shared registry, recovering from poisoning.
///
/// Registry operations cannot leave the table in a torn state (each one
/// completes or returns an error before unlocking), so a panic while
/// holding the lock doesn't invalidate the data.
pub fn lock_registry(registry: &SharedRegistry) -> MutexGuard<'_, SessionRegistry> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

/// Bounded collection of live sessions.
///
/// Invariants: client ids are pairwise distinct, the session count never
/// exceeds the configured capacity, and the backing `Vec` stays densely
/// packed (removal compacts, preserving relative order).
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
    max_sessions: usize,
    max_entries: usize,
}

impl SessionRegistry {
    /// Creates an empty registry holding at most `max_sessions` sessions
    /// of at most `max_entries` entries each.
    pub fn new(max_sessions: usize, max_entries: usize) -> Self {
        Self {
            sessions: Vec::new(),
            max_sessions,
            max_entries,
        }
    }

    /// Creates a registry already wrapped in the shared guard handle.
    pub fn shared(max_sessions: usize, max_entries: usize) -> SharedRegistry {
        Arc::new(Mutex::new(Self::new(max_sessions, max_entries)))
    }

    /// Creates a new empty session for `client_id`.
    pub fn insert(&mut self, client_id: &str) -> Result<(), RegistryError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(RegistryError::CapacityExceeded);
        }
        if self.find(client_id).is_some() {
            return Err(RegistryError::DuplicateId);
        }
        self.sessions
            .push(Session::new(client_id.to_string(), self.max_entries));
        Ok(())
    }

    /// Looks up the session for `client_id`.
    pub fn find(&self, client_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.client_id() == client_id)
    }

    /// Looks up the session for `client_id` for mutation.
    pub fn find_mut(&mut self, client_id: &str) -> Option<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.client_id() == client_id)
    }

    /// Removes the session for `client_id` and all its entries,
    /// compacting the table so no gap remains.
    pub fn remove(&mut self, client_id: &str) -> Result<(), RegistryError> {
        let idx = self
            .sessions
            .iter()
            .position(|s| s.client_id() == client_id)
            .ok_or(RegistryError::NotFound)?;
        self.sessions.remove(idx);
        Ok(())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Configured session capacity.
    pub fn capacity(&self) -> usize {
        self.max_sessions
    }
}
