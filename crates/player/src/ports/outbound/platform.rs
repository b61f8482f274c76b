//! Platform abstraction ports
//!
//! These traits abstract the durable key-value medium and the clock so that
//! application services stay platform-agnostic and can be tested with
//! in-memory implementations.

use chrono::{DateTime, Utc};

/// Failures of the durable key-value medium.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The medium does not exist in this environment.
    #[error("Storage is not available in this environment")]
    Unavailable,

    /// The medium exists but the operation failed (quota, I/O, permissions).
    #[error("Storage {operation} failed: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },
}

impl StorageError {
    pub fn io(operation: &'static str, message: impl ToString) -> Self {
        Self::Io {
            operation,
            message: message.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Persistent storage abstraction (localStorage-like, file-based on desktop)
///
/// Values are opaque strings; callers own serialization.
pub trait StorageProvider: Send + Sync {
    /// Load a string value by key, `Ok(None)` if nothing is stored under it
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Save a string value with the given key, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Wall clock, injectable for tests.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Storage key constants
///
/// These are kept in the ports layer as they define the persisted layout:
/// three independent top-level records in the same medium.
pub mod storage_keys {
    /// One JSON object mapping slot key to save slot.
    pub const SAVE_SLOTS: &str = "heroStoryGameSavesList";
    /// One JSON object with the user profile.
    pub const USER_PROFILE: &str = "heroStoryUserProfile";
    /// One JSON array with achievement state.
    pub const ACHIEVEMENTS: &str = "heroStoryUserAchievements";
}
