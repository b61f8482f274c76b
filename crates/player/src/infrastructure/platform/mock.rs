//! In-memory storage providers
//!
//! Used by tests and by ephemeral sessions that should not touch disk.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ports::outbound::{StorageError, StorageProvider};

/// Storage kept in a shared map. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStorageProvider {
    entries: Arc<Mutex<HashMap<String, String>>>,
    reject_writes: Arc<Mutex<Option<String>>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value without going through `save`.
    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    /// Make every following `save` fail with `message` (quota, permissions...).
    pub fn reject_writes(&self, message: impl Into<String>) {
        if let Ok(mut reject) = self.reject_writes.lock() {
            *reject = Some(message.into());
        }
    }

    pub fn accept_writes(&self) {
        if let Ok(mut reject) = self.reject_writes.lock() {
            *reject = None;
        }
    }

    /// Raw stored value, for assertions.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl StorageProvider for MemoryStorageProvider {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::io("read_lock", e))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let rejected = self
            .reject_writes
            .lock()
            .map_err(|e| StorageError::io("write_lock", e))?
            .clone();
        if let Some(message) = rejected {
            return Err(StorageError::io("write", message));
        }

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::io("write_lock", e))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Medium that does not exist in this environment.
#[derive(Clone, Copy, Default)]
pub struct UnavailableStorageProvider;

impl StorageProvider for UnavailableStorageProvider {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}
