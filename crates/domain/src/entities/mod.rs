//! Domain entities - story log, save slots and profile records

mod game_metadata;
mod profile;
mod save_slot;
mod story_entry;

pub use game_metadata::{
    GameMetadata, MetadataPatch, DEFAULT_STORY_DESCRIPTION, DEFAULT_STORY_TITLE,
};
pub use profile::{merge_achievements, Achievement, UserProfile};
pub use save_slot::{GameSaveSlot, RawStoryLog, SlotSummary};
pub use story_entry::{
    EntryKind, StoryAction, StoryEntry, CONTINUE_SENTINEL, LEGACY_CONTINUE_SENTINEL,
};
