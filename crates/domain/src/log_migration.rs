//! Story log migration - upgrades any persisted log shape to canonical entries
//!
//! Saves written over the client's lifetime hold three shapes:
//!
//! 1. an array of bare strings (earliest saves recorded only generated text),
//! 2. an array of entry objects with missing fields or retired action tags,
//! 3. the current `{ id, type, text, action }` shape.
//!
//! [`normalize_story_log`] maps all of them to `Vec<StoryEntry>`. It never
//! fails: input it cannot recognize yields an empty log, so a corrupt save
//! degrades to an empty story instead of an error.
//!
//! Normalization is idempotent. Canonical entries map to themselves, and no
//! player entry ever leaves with the `История` tag (that tag is always
//! resolved to CONTINUE or WRITE for players), so a second pass has nothing
//! left to rewrite.

use serde_json::{Map, Value};

use crate::{EntryId, EntryKind, StoryAction, StoryEntry};

/// The recognized top-level shapes of a persisted log.
#[derive(Debug)]
enum LegacyLog<'a> {
    /// Earliest format: every element is generated narrative text.
    PlainText(Vec<&'a str>),
    /// Entry-like objects, legacy or current. Stray non-object elements are
    /// kept as `None` and upgrade to empty entries.
    Structured(Vec<Option<&'a Map<String, Value>>>),
}

impl<'a> LegacyLog<'a> {
    /// Dispatch on the first element: strings (every element must be one),
    /// else objects, else reject.
    fn decode(raw: &'a Value) -> Option<Self> {
        let items = raw.as_array()?;

        match items.first()? {
            Value::String(_) => items
                .iter()
                .map(Value::as_str)
                .collect::<Option<Vec<_>>>()
                .map(Self::PlainText),
            Value::Object(_) => Some(Self::Structured(
                items.iter().map(Value::as_object).collect(),
            )),
            _ => None,
        }
    }
}

/// Normalize a raw story log into canonical entries. See the module docs.
pub fn normalize_story_log(raw: &Value) -> Vec<StoryEntry> {
    match LegacyLog::decode(raw) {
        Some(LegacyLog::PlainText(texts)) => texts
            .into_iter()
            .map(StoryEntry::narration)
            .collect(),
        Some(LegacyLog::Structured(entries)) => entries.into_iter().map(upgrade_entry).collect(),
        None => Vec::new(),
    }
}

fn upgrade_entry(raw: Option<&Map<String, Value>>) -> StoryEntry {
    let field = |name: &str| raw.and_then(|fields| fields.get(name));

    let id = field("id").and_then(legacy_id).unwrap_or_default();

    let kind = field("type")
        .and_then(Value::as_str)
        .and_then(|kind| kind.parse().ok())
        .unwrap_or(EntryKind::Ai);

    let text = field("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let action = match kind {
        // AI entries have exactly one valid tag
        EntryKind::Ai => StoryAction::Narrate,
        EntryKind::Player => {
            player_action(field("action").and_then(Value::as_str), &text)
        }
    };

    StoryEntry {
        id,
        kind,
        text,
        action,
    }
}

/// Keep usable ids, including numeric ones from hand-edited saves.
fn legacy_id(value: &Value) -> Option<EntryId> {
    match value {
        Value::String(id) => EntryId::parse(id.as_str()).ok(),
        Value::Number(id) => EntryId::parse(id.to_string()).ok(),
        _ => None,
    }
}

fn player_action(tag: Option<&str>, text: &str) -> StoryAction {
    match tag {
        Some(tag) if StoryAction::is_retired_act_tag(tag) => StoryAction::Act,
        Some(tag) => match tag.parse::<StoryAction>() {
            Ok(StoryAction::Narrate) | Err(_) => authored_action(text),
            Ok(current) => current,
        },
        None => authored_action(text),
    }
}

/// Player entries once shared the narration tag: either a "continue" request
/// or a segment the player wrote.
fn authored_action(text: &str) -> StoryAction {
    if StoryEntry::is_continue_text(text) {
        StoryAction::Continue
    } else {
        StoryAction::Write
    }
}
