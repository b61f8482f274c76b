extern crate self as herostory_domain;

pub mod common;
pub mod entities;
pub mod error;
pub mod ids;
pub mod log_migration;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    merge_achievements, Achievement, EntryKind, GameMetadata, GameSaveSlot, MetadataPatch,
    RawStoryLog, SlotSummary, StoryAction, StoryEntry, UserProfile, CONTINUE_SENTINEL,
    DEFAULT_STORY_DESCRIPTION, DEFAULT_STORY_TITLE,
};

pub use error::DomainError;

// Re-export ID types
pub use ids::{EntryId, SlotKey};

pub use log_migration::normalize_story_log;
