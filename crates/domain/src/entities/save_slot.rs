//! GameSaveSlot - the persisted unit of one saved game
//!
//! The log is kept as raw JSON inside a slot: saves written by older clients
//! hold legacy shapes, and normalization is the caller's job
//! (see [`crate::log_migration`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::datetime_from_millis;
use crate::{normalize_story_log, GameMetadata, SlotKey, StoryEntry};

/// A story log exactly as persisted, possibly in a legacy format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStoryLog(serde_json::Value);

impl RawStoryLog {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Canonical entries for this log. Never fails.
    pub fn normalize(&self) -> Vec<StoryEntry> {
        normalize_story_log(&self.0)
    }
}

impl From<&[StoryEntry]> for RawStoryLog {
    fn from(entries: &[StoryEntry]) -> Self {
        Self(serde_json::Value::Array(
            entries
                .iter()
                // Only strings and unit enums: serializing a StoryEntry cannot fail
                .map(|entry| serde_json::to_value(entry).unwrap_or(serde_json::Value::Null))
                .collect(),
        ))
    }
}

impl From<Vec<StoryEntry>> for RawStoryLog {
    fn from(entries: Vec<StoryEntry>) -> Self {
        Self::from(entries.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSaveSlot {
    #[serde(default)]
    pub log: RawStoryLog,
    #[serde(default)]
    pub metadata: GameMetadata,
    /// Epoch milliseconds of the last write
    #[serde(default)]
    pub last_modified: i64,
}

impl GameSaveSlot {
    pub fn new(log: &[StoryEntry], metadata: GameMetadata, last_modified: i64) -> Self {
        Self {
            log: RawStoryLog::from(log),
            metadata,
            last_modified,
        }
    }

    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        datetime_from_millis(self.last_modified)
    }
}

/// What a save list shows for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub key: SlotKey,
    pub title: String,
    pub description: String,
    pub is_published: bool,
    pub keywords: String,
    pub entry_count: usize,
    pub last_modified: i64,
}

impl SlotSummary {
    pub fn from_slot(key: SlotKey, slot: &GameSaveSlot) -> Self {
        Self {
            key,
            title: slot.metadata.story_title.clone(),
            description: slot.metadata.story_description.clone(),
            is_published: slot.metadata.is_published,
            keywords: slot.metadata.keywords.clone(),
            entry_count: slot.log.normalize().len(),
            last_modified: slot.last_modified,
        }
    }
}
