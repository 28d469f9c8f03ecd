//! Per-client session state.

use crate::error::StoreError;

/// One key-value pair in a session's store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// A connected client's private key-value store.
///
/// Entries live in a densely packed `Vec` in insertion order, bounded by
/// an explicit capacity. PUT on an existing key overwrites its value in
/// place — position and count are unchanged. DELETE removes the entry
/// and shifts the remainder left, so iteration and capacity checks stay
/// O(len) with no gaps.
#[derive(Debug)]
pub struct Session {
    client_id: String,
    entries: Vec<Entry>,
    max_entries: usize,
}

impl Session {
    pub(crate) fn new(client_id: String, max_entries: usize) -> Self {
        Self {
            client_id,
            entries: Vec::new(),
            max_entries,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `value` under `key`.
    ///
    /// An existing key is overwritten in place without a capacity check;
    /// a new key at capacity fails with [`StoreError::StoreFull`].
    pub fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.value = value.to_string();
            return Ok(());
        }
        if self.entries.len() >= self.max_entries {
            return Err(StoreError::StoreFull);
        }
        self.entries.push(Entry {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Looks up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Removes the entry under `key`, compacting the remaining entries
    /// while preserving their relative order.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.key == key)
            .ok_or(StoreError::NotFound)?;
        // Vec::remove shifts the tail left: dense, order-preserving
        self.entries.remove(idx);
        Ok(())
    }

    /// Keys in insertion order. Used by tests to check compaction.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}
