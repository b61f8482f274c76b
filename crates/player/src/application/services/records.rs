//! Reading and writing whole top-level records in the storage medium.
//!
//! Every record shares one policy: reads never fail (absent, unavailable and
//! corrupt all read as "nothing stored"), an absent medium turns writes into
//! logged no-ops, and a medium that rejects a write surfaces
//! [`SaveError::PersistenceFailure`].

use serde::Serialize;
use serde_json::Value;

use crate::application::SaveError;
use crate::ports::outbound::{StorageError, StorageProvider};

/// Outcome of a raw read, keeping "medium absent" apart from "nothing stored".
pub(crate) enum RecordRead {
    Found(Value),
    Empty,
    Unavailable,
    Failed(StorageError),
}

pub(crate) fn read_record(storage: &dyn StorageProvider, key: &str) -> RecordRead {
    match storage.load(key) {
        Ok(Some(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(value) => RecordRead::Found(value),
            Err(e) => {
                tracing::warn!(storage_key = key, error = %e, "Stored record is corrupt, treating as empty");
                RecordRead::Empty
            }
        },
        Ok(None) => RecordRead::Empty,
        Err(StorageError::Unavailable) => {
            tracing::warn!(storage_key = key, "Storage unavailable, nothing to read");
            RecordRead::Unavailable
        }
        Err(e) => {
            tracing::warn!(storage_key = key, error = %e, "Failed to read stored record");
            RecordRead::Failed(e)
        }
    }
}

/// Lenient read for paths that never fail.
pub(crate) fn read_record_value(storage: &dyn StorageProvider, key: &str) -> Option<Value> {
    match read_record(storage, key) {
        RecordRead::Found(value) => Some(value),
        RecordRead::Empty | RecordRead::Unavailable | RecordRead::Failed(_) => None,
    }
}

/// Serialize `record` and store it under `key`.
///
/// `subject` names what was being saved in a [`SaveError::PersistenceFailure`].
pub(crate) fn write_record<T: Serialize + ?Sized>(
    storage: &dyn StorageProvider,
    key: &str,
    record: &T,
    subject: &str,
) -> Result<(), SaveError> {
    let text = serde_json::to_string(record).map_err(|e| {
        tracing::error!(storage_key = key, error = %e, "Failed to serialize record");
        SaveError::persistence(subject, e)
    })?;

    match storage.save(key, &text) {
        Ok(()) => Ok(()),
        Err(StorageError::Unavailable) => {
            tracing::warn!(storage_key = key, "Storage unavailable, write skipped");
            Ok(())
        }
        Err(e) => {
            tracing::error!(storage_key = key, error = %e, "Storage rejected write");
            Err(SaveError::persistence(subject, e))
        }
    }
}
