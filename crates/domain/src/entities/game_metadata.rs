//! GameMetadata - descriptive record attached to every save slot
//!
//! Every optional field is materialized as an empty string (or `false`) on
//! read, so callers never see "absent" values. [`MetadataPatch`] carries
//! partial edits that are overlaid field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::format_day_month_year;

/// Title used when a slot carries none.
pub const DEFAULT_STORY_TITLE: &str = "Безымянная история";

/// Description used when a slot carries none.
pub const DEFAULT_STORY_DESCRIPTION: &str = "Нет описания.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameMetadata {
    pub story_title: String,
    pub story_description: String,
    pub is_published: bool,
    /// Comma-joined tags
    pub keywords: String,
    pub player_name: String,
    pub player_race: String,
    /// e.g. king, peasant, rebel leader
    pub player_social_status: String,
    /// e.g. "Medieval era, year 1250, during a harsh winter"
    pub event_time_details: String,
    pub universe_name: String,
    /// Player notes the generator should take into account
    pub custom_additions: String,
    pub character_name: String,
    pub character_appearance: String,
    pub character_powers: String,
}

impl Default for GameMetadata {
    fn default() -> Self {
        Self {
            story_title: DEFAULT_STORY_TITLE.to_string(),
            story_description: DEFAULT_STORY_DESCRIPTION.to_string(),
            is_published: false,
            keywords: String::new(),
            player_name: String::new(),
            player_race: String::new(),
            player_social_status: String::new(),
            event_time_details: String::new(),
            universe_name: String::new(),
            custom_additions: String::new(),
            character_name: String::new(),
            character_appearance: String::new(),
            character_powers: String::new(),
        }
    }
}

impl GameMetadata {
    pub fn new(story_title: impl Into<String>, story_description: impl Into<String>) -> Self {
        Self {
            story_title: story_title.into(),
            story_description: story_description.into(),
            ..Self::default()
        }
    }

    /// Title for a save that carries no metadata, dated by its last write.
    pub fn dated_title(date: DateTime<Utc>) -> String {
        format!("История от {}", format_day_month_year(date))
    }

    /// Replace a blank title or description with the canonical defaults.
    pub fn with_canonical_defaults(mut self) -> Self {
        if self.story_title.is_empty() {
            self.story_title = DEFAULT_STORY_TITLE.to_string();
        }
        if self.story_description.is_empty() {
            self.story_description = DEFAULT_STORY_DESCRIPTION.to_string();
        }
        self
    }

    /// Overlay every field present in `patch`.
    pub fn merged(mut self, patch: &MetadataPatch) -> Self {
        patch.apply_to(&mut self);
        self
    }
}

/// Partial metadata edit. `None` leaves the existing value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_race: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_social_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_additions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_appearance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_powers: Option<String>,
}

impl MetadataPatch {
    /// Patch that only flips the published flag.
    pub fn published(is_published: bool) -> Self {
        Self {
            is_published: Some(is_published),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, metadata: &mut GameMetadata) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }

        set(&mut metadata.story_title, &self.story_title);
        set(&mut metadata.story_description, &self.story_description);
        if let Some(is_published) = self.is_published {
            metadata.is_published = is_published;
        }
        set(&mut metadata.keywords, &self.keywords);
        set(&mut metadata.player_name, &self.player_name);
        set(&mut metadata.player_race, &self.player_race);
        set(&mut metadata.player_social_status, &self.player_social_status);
        set(&mut metadata.event_time_details, &self.event_time_details);
        set(&mut metadata.universe_name, &self.universe_name);
        set(&mut metadata.custom_additions, &self.custom_additions);
        set(&mut metadata.character_name, &self.character_name);
        set(&mut metadata.character_appearance, &self.character_appearance);
        set(&mut metadata.character_powers, &self.character_powers);
    }
}
