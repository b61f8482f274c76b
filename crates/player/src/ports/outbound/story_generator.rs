//! Text generation port.
//!
//! The generator is an opaque async collaborator: it receives the assembled
//! story context and returns the next narrative segment. Prompt wording and
//! transport belong to the adapter.

use async_trait::async_trait;

use herostory_domain::common::none_if_empty;
use herostory_domain::{GameMetadata, StoryAction};

/// World and character descriptors taken from the slot metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldDescriptors {
    pub player_name: Option<String>,
    pub player_race: Option<String>,
    pub player_social_status: Option<String>,
    pub event_time_details: Option<String>,
    pub universe_name: Option<String>,
    pub custom_additions: Option<String>,
}

impl WorldDescriptors {
    pub fn from_metadata(metadata: &GameMetadata) -> Self {
        let opt = |value: &str| none_if_empty(value).map(str::to_string);
        Self {
            player_name: opt(&metadata.player_name),
            player_race: opt(&metadata.player_race),
            player_social_status: opt(&metadata.player_social_status),
            event_time_details: opt(&metadata.event_time_details),
            universe_name: opt(&metadata.universe_name),
            custom_additions: opt(&metadata.custom_additions),
        }
    }
}

/// Context for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Story so far, entry texts joined by blank lines
    pub narrative_so_far: String,
    /// ACT, CONTINUE, or NARRATE when opening a new story
    pub action: StoryAction,
    pub player_input: Option<String>,
    /// Set for the call that opens a brand-new story
    pub is_story_start: bool,
    pub world: WorldDescriptors,
}

impl GenerationRequest {
    pub fn new(narrative_so_far: impl Into<String>, action: StoryAction) -> Self {
        Self {
            narrative_so_far: narrative_so_far.into(),
            action,
            player_input: None,
            is_story_start: false,
            world: WorldDescriptors::default(),
        }
    }

    pub fn with_player_input(mut self, input: impl Into<String>) -> Self {
        self.player_input = Some(input.into());
        self
    }

    pub fn with_world(mut self, world: WorldDescriptors) -> Self {
        self.world = world;
        self
    }

    pub fn story_start(mut self) -> Self {
        self.is_story_start = true;
        self
    }
}

/// Structured generator output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub next_text: String,
    /// Comma-separated keywords, usually only for story openings
    pub optional_keywords: Option<String>,
}

impl GenerationResult {
    pub fn text(next_text: impl Into<String>) -> Self {
        Self {
            next_text: next_text.into(),
            optional_keywords: None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest)
        -> Result<GenerationResult, GenerationError>;
}
