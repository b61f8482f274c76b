//! Story Session - one game in progress
//!
//! A [`GameSession`] owns the canonical log and metadata of one slot while it
//! is being played. Player turns are appended here, the generator is asked
//! for the continuation, and the whole state is written back through the
//! [`SaveSlotStore`] on explicit saves and by the autosave task.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use herostory_domain::common::{format_day_month_year, truncate_with_ellipsis};
use herostory_domain::{
    GameMetadata, GameSaveSlot, MetadataPatch, SlotKey, StoryAction, StoryEntry,
    CONTINUE_SENTINEL,
};

use super::SaveSlotStore;
use crate::application::{SaveError, SessionError};
use crate::ports::outbound::{ClockPort, GenerationRequest, StoryGenerator, WorldDescriptors};
use crate::state::Platform;

/// Narrative context sent with the request that opens a new story.
const OPENING_CONTEXT: &str =
    "Начало новой игры. Мир был только что создан по детальному описанию игрока.";

/// Characters of the world prompt kept as the story description.
const DESCRIPTION_MAX_CHARS: usize = 150;

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionServices {
    pub slots: Arc<SaveSlotStore>,
    pub generator: Arc<dyn StoryGenerator>,
    pub clock: Arc<dyn ClockPort>,
}

impl SessionServices {
    pub fn new(
        slots: Arc<SaveSlotStore>,
        generator: Arc<dyn StoryGenerator>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            slots,
            generator,
            clock,
        }
    }

    pub fn from_platform(platform: &Platform, generator: Arc<dyn StoryGenerator>) -> Self {
        Self::new(
            Arc::new(SaveSlotStore::from_platform(platform)),
            generator,
            platform.clock(),
        )
    }
}

/// What the player filled in on the new-game form.
///
/// Empty strings count as "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStoryDetails {
    pub world_prompt: String,
    pub story_title: Option<String>,
    pub keywords: Option<String>,
    pub player_name: Option<String>,
    pub player_race: Option<String>,
    pub player_social_status: Option<String>,
    pub event_time_details: Option<String>,
    pub universe_name: Option<String>,
    pub custom_additions: Option<String>,
}

impl NewStoryDetails {
    pub fn new(world_prompt: impl Into<String>) -> Self {
        Self {
            world_prompt: world_prompt.into(),
            ..Self::default()
        }
    }

    /// Player input for the opening request: the world prompt followed by
    /// one labelled line per given descriptor.
    fn opening_input(&self) -> String {
        let mut input = format!("Основное описание мира: {}\n", self.world_prompt);
        let lines = [
            ("Имя Игрока", &self.player_name),
            ("Раса Игрока", &self.player_race),
            ("Социальный Статус Игрока", &self.player_social_status),
            ("Время и Место Событий", &self.event_time_details),
            ("Вселенная", &self.universe_name),
            ("Особые Замечания/Добавления от Игрока", &self.custom_additions),
        ];
        for (label, value) in lines {
            if let Some(value) = given(value) {
                input.push_str(&format!("\n{label}: {value}"));
            }
        }
        input
    }

    fn world(&self) -> WorldDescriptors {
        let owned = |value: &Option<String>| given(value).map(str::to_string);
        WorldDescriptors {
            player_name: owned(&self.player_name),
            player_race: owned(&self.player_race),
            player_social_status: owned(&self.player_social_status),
            event_time_details: owned(&self.event_time_details),
            universe_name: owned(&self.universe_name),
            custom_additions: owned(&self.custom_additions),
        }
    }

    fn into_metadata(
        self,
        created_at: DateTime<Utc>,
        generated_keywords: Option<&str>,
    ) -> GameMetadata {
        let keywords = generated_keywords
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.keywords.as_deref().filter(|k| !k.trim().is_empty()))
            .unwrap_or_default()
            .to_string();

        let story_title = given(&self.story_title)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("Новая история от {}", format_day_month_year(created_at))
            });

        let owned = |value: &Option<String>| given(value).unwrap_or_default().to_string();

        GameMetadata {
            story_title,
            story_description: truncate_with_ellipsis(&self.world_prompt, DESCRIPTION_MAX_CHARS),
            is_published: false,
            keywords,
            player_name: owned(&self.player_name),
            player_race: owned(&self.player_race),
            player_social_status: owned(&self.player_social_status),
            event_time_details: owned(&self.event_time_details),
            universe_name: owned(&self.universe_name),
            custom_additions: owned(&self.custom_additions),
            character_name: owned(&self.player_name),
            ..GameMetadata::default()
        }
    }
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Describe an action or a line of speech for the generator to resolve
    Act(String),
    /// Write the next story segment directly
    Write(String),
    /// Let the generator move the plot on
    Continue,
}

impl PlayerAction {
    pub fn story_action(&self) -> StoryAction {
        match self {
            Self::Act(_) => StoryAction::Act,
            Self::Write(_) => StoryAction::Write,
            Self::Continue => StoryAction::Continue,
        }
    }
}

pub struct GameSession {
    services: SessionServices,
    key: SlotKey,
    log: Vec<StoryEntry>,
    metadata: GameMetadata,
    last_modified: i64,
}

impl GameSession {
    /// Generate the opening of a new story and save it under a fresh key.
    ///
    /// A failed first save is logged; the session is still returned.
    pub async fn start_new(
        services: SessionServices,
        details: NewStoryDetails,
    ) -> Result<Self, SessionError> {
        if details.world_prompt.trim().is_empty() {
            return Err(SessionError::EmptyWorldPrompt);
        }

        let request = GenerationRequest::new(OPENING_CONTEXT, StoryAction::Narrate)
            .with_player_input(details.opening_input())
            .with_world(details.world())
            .story_start();

        let opening = services.generator.generate(request).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to generate story opening");
            e
        })?;

        let created_at = services.clock.now();
        let key = SlotKey::from_millis(created_at.timestamp_millis());
        let metadata = details.into_metadata(created_at, opening.optional_keywords.as_deref());

        let mut session = Self {
            services,
            key,
            log: vec![StoryEntry::narration(opening.next_text)],
            metadata,
            last_modified: 0,
        };

        if let Err(e) = session.persist().await {
            tracing::warn!(slot_key = %session.key, error = %e, "Failed to pre-save new story");
        }

        tracing::info!(slot_key = %session.key, title = %session.metadata.story_title, "Started new story");
        Ok(session)
    }

    /// Resume the story saved under `key`, upgrading legacy logs.
    pub async fn load(services: SessionServices, key: SlotKey) -> Result<Self, SessionError> {
        let slot = services
            .slots
            .read_slot(&key)
            .await
            .ok_or_else(|| SessionError::SlotNotFound(key.clone()))?;

        let log = slot.log.normalize();
        let last_modified = slot.last_modified;
        let saved_at = slot.last_modified_at().filter(|_| last_modified != 0);

        let mut metadata = slot.metadata;
        if metadata.story_title.trim().is_empty() {
            let date = saved_at.unwrap_or_else(|| services.clock.now());
            metadata.story_title = GameMetadata::dated_title(date);
        }
        let metadata = metadata.with_canonical_defaults();

        tracing::info!(slot_key = %key, entries = log.len(), "Loaded story");
        Ok(Self {
            services,
            key,
            log,
            metadata,
            last_modified,
        })
    }

    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    pub fn log(&self) -> &[StoryEntry] {
        &self.log
    }

    pub fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    /// Epoch millis of the last successful save, 0 if never saved.
    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// The story so far as the generator sees it.
    pub fn history_text(&self) -> String {
        self.log
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Play one turn and return the last entry it appended.
    ///
    /// WRITE is saved immediately and never reaches the generator. ACT and
    /// CONTINUE append the player entry, then the generated continuation; if
    /// generation fails a notice entry is appended instead and the error is
    /// returned. Those turns are saved by the next save or autosave.
    pub async fn submit(&mut self, action: PlayerAction) -> Result<StoryEntry, SessionError> {
        tracing::debug!(slot_key = %self.key, action = %action.story_action(), "Player turn");
        match action {
            PlayerAction::Write(text) => {
                let text = required_input(text)?;
                let entry = StoryEntry::player(StoryAction::Write, text);
                self.log.push(entry.clone());
                self.persist().await?;
                Ok(entry)
            }
            PlayerAction::Act(text) => {
                let text = required_input(text)?;
                let display = format!("Игрок действует: \"{text}\"");
                self.advance(StoryAction::Act, display, Some(text)).await
            }
            PlayerAction::Continue => {
                self.advance(StoryAction::Continue, CONTINUE_SENTINEL.to_string(), None)
                    .await
            }
        }
    }

    /// Overlay `patch` on the current metadata and save.
    pub async fn update_metadata(&mut self, patch: &MetadataPatch) -> Result<(), SessionError> {
        self.metadata = std::mem::take(&mut self.metadata)
            .with_canonical_defaults()
            .merged(patch);
        self.persist().await?;
        Ok(())
    }

    /// Write the current state to the slot. An empty log is never written.
    pub async fn persist(&mut self) -> Result<(), SaveError> {
        if self.log.is_empty() {
            tracing::debug!(slot_key = %self.key, "Nothing to save yet");
            return Ok(());
        }

        let last_modified = self.services.slots.next_modified(self.last_modified);
        let slot = GameSaveSlot::new(&self.log, self.metadata.clone(), last_modified);
        self.services.slots.write_slot(&self.key, &slot).await?;
        self.last_modified = last_modified;
        Ok(())
    }

    async fn advance(
        &mut self,
        action: StoryAction,
        display: String,
        player_input: Option<String>,
    ) -> Result<StoryEntry, SessionError> {
        self.log.push(StoryEntry::player(action, display));

        let mut request = GenerationRequest::new(self.history_text(), action)
            .with_world(WorldDescriptors::from_metadata(&self.metadata));
        if let Some(input) = player_input {
            request = request.with_player_input(input);
        }

        match self.services.generator.generate(request).await {
            Ok(result) => {
                let entry = StoryEntry::narration(result.next_text);
                self.log.push(entry.clone());
                Ok(entry)
            }
            Err(e) => {
                tracing::error!(slot_key = %self.key, %action, error = %e, "Failed to generate continuation");
                self.log.push(StoryEntry::narration(format!(
                    "Произошла ошибка при обработке действия \"{action}\". Попробуйте еще раз."
                )));
                Err(e.into())
            }
        }
    }
}

fn required_input(text: String) -> Result<String, SessionError> {
    if text.trim().is_empty() {
        return Err(SessionError::EmptyInput);
    }
    Ok(text)
}
