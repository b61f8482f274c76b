//! StoryEntry entity - one turn of the narrative
//!
//! A story log is an ordered `Vec<StoryEntry>`; insertion order is narrative
//! order. The wire shape is `{ "id", "type", "text", "action" }` with the
//! Russian action tags the client has always persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DomainError, EntryId};

/// Phrase recorded for a CONTINUE turn.
pub const CONTINUE_SENTINEL: &str = "Игрок продвигает историю дальше.";

/// Older phrasing of [`CONTINUE_SENTINEL`] found in early saves.
pub const LEGACY_CONTINUE_SENTINEL: &str = "Игрок продвигает сюжет.";

/// Who authored an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Ai,
    Player,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Player => "player",
        }
    }
}

impl FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(Self::Ai),
            "player" => Ok(Self::Player),
            _ => Err(DomainError::parse(format!("Unknown entry kind: {}", s))),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an entry represents in the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryAction {
    /// Player performed a described action or spoke.
    #[serde(rename = "Действовать")]
    Act,
    /// Player authored a narrative segment directly, bypassing the generator.
    #[serde(rename = "ПисатьИсторию")]
    Write,
    /// Player asked the generator to advance the plot with no input.
    #[serde(rename = "ПродолжитьСюжет")]
    Continue,
    /// Generator-authored text and the story-opening entry.
    #[serde(rename = "История")]
    Narrate,
}

impl StoryAction {
    /// The persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Act => "Действовать",
            Self::Write => "ПисатьИсторию",
            Self::Continue => "ПродолжитьСюжет",
            Self::Narrate => "История",
        }
    }

    /// Tags retired in favour of [`StoryAction::Act`] ("say" and "do").
    pub fn is_retired_act_tag(tag: &str) -> bool {
        matches!(tag, "Сказать" | "Делать")
    }
}

impl FromStr for StoryAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Действовать" => Ok(Self::Act),
            "ПисатьИсторию" => Ok(Self::Write),
            "ПродолжитьСюжет" => Ok(Self::Continue),
            "История" => Ok(Self::Narrate),
            _ => Err(DomainError::parse(format!("Unknown story action: {}", s))),
        }
    }
}

impl fmt::Display for StoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single canonical log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEntry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub text: String,
    pub action: StoryAction,
}

impl StoryEntry {
    /// Generator-authored narration with a fresh id.
    pub fn narration(text: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Ai,
            text: text.into(),
            action: StoryAction::Narrate,
        }
    }

    /// A player turn with a fresh id.
    pub fn player(action: StoryAction, text: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Player,
            text: text.into(),
            action,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.kind == EntryKind::Ai
    }

    /// Whether `text` carries one of the "player advanced the plot" phrases.
    pub fn is_continue_text(text: &str) -> bool {
        text.contains(CONTINUE_SENTINEL) || text.contains(LEGACY_CONTINUE_SENTINEL)
    }
}
