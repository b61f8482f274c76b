//! Application service error types

use herostory_domain::SlotKey;

use crate::ports::outbound::GenerationError;

/// Errors surfaced by the slot and profile stores
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    /// The medium rejected the write, or the record could not be serialized
    #[error("Failed to persist {key}: {message}")]
    PersistenceFailure { key: String, message: String },

    #[error("Save slot not found: {0}")]
    SlotNotFound(SlotKey),
}

impl SaveError {
    pub fn persistence(key: impl Into<String>, message: impl ToString) -> Self {
        Self::PersistenceFailure {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// Errors surfaced by a story session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Save slot not found: {0}")]
    SlotNotFound(SlotKey),

    #[error("Player input is empty")]
    EmptyInput,

    #[error("World description is empty")]
    EmptyWorldPrompt,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Save(#[from] SaveError),
}
