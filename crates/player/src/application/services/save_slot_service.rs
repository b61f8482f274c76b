//! Save Slot Store - persistence of saved games
//!
//! All slots live in one JSON object `{ slotKey: GameSaveSlot }` stored under
//! [`storage_keys::SAVE_SLOTS`]. Every write loads the whole mapping, replaces
//! one key and stores the whole mapping again. The store owns that shared
//! record: an async mutex serializes its load-mutate-store cycles, so two
//! writers in this process never drop each other's slots. Nothing guards
//! against other processes; the later full write wins.
//!
//! Slots are decoded one at a time. A corrupt slot is skipped on read and
//! kept untouched when other slots are written.
//!
//! Reads do not take the mutex. They rely on the provider handing back a
//! whole record, never a half-written one.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use herostory_domain::common::datetime_from_millis;
use herostory_domain::{
    GameMetadata, GameSaveSlot, MetadataPatch, SlotKey, SlotSummary, DEFAULT_STORY_DESCRIPTION,
};

use super::records::{read_record, read_record_value, write_record, RecordRead};
use crate::application::SaveError;
use crate::ports::outbound::{storage_keys, ClockPort, StorageProvider};
use crate::state::Platform;

pub struct SaveSlotStore {
    storage: Arc<dyn StorageProvider>,
    clock: Arc<dyn ClockPort>,
    write_lock: Mutex<()>,
}

impl SaveSlotStore {
    pub fn new(storage: Arc<dyn StorageProvider>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            storage,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_platform(platform: &Platform) -> Self {
        Self::new(platform.storage(), platform.clock())
    }

    /// Replace the slot stored under `key`.
    ///
    /// An absent medium makes this a logged no-op. A medium that rejects the
    /// write surfaces [`SaveError::PersistenceFailure`].
    pub async fn write_slot(&self, key: &SlotKey, slot: &GameSaveSlot) -> Result<(), SaveError> {
        let _guard = self.write_lock.lock().await;
        match self.read_mapping(key)? {
            Some(slots) => self.store_slot(slots, key, slot),
            None => Ok(()),
        }
    }

    /// The slot stored under `key`, if any. Never fails.
    pub async fn read_slot(&self, key: &SlotKey) -> Option<GameSaveSlot> {
        let mut slots = self.load_slots();
        let raw = slots.remove(key.as_str())?;
        self.decode_slot(key.as_str(), raw)
    }

    /// Every readable slot. Never fails; corrupt data reads as empty.
    pub async fn read_all_slots(&self) -> BTreeMap<SlotKey, GameSaveSlot> {
        self.load_slots()
            .into_iter()
            .filter_map(|(key, raw)| {
                let slot = self.decode_slot(&key, raw)?;
                let key = SlotKey::parse(key).ok()?;
                Some((key, slot))
            })
            .collect()
    }

    /// Overlay `patch` on the stored metadata and bump `lastModified`.
    ///
    /// Blank titles and descriptions are replaced by the defaults before the
    /// patch is applied. Returns the slot as written, or `None` when the
    /// medium is absent and nothing was read or written.
    pub async fn update_metadata(
        &self,
        key: &SlotKey,
        patch: &MetadataPatch,
    ) -> Result<Option<GameSaveSlot>, SaveError> {
        let _guard = self.write_lock.lock().await;

        let Some(mut slots) = self.read_mapping(key)? else {
            tracing::warn!(slot_key = %key, "Storage unavailable, metadata update skipped");
            return Ok(None);
        };
        let mut slot = slots
            .remove(key.as_str())
            .and_then(|raw| self.decode_slot(key.as_str(), raw))
            .ok_or_else(|| SaveError::SlotNotFound(key.clone()))?;

        slot.metadata = slot.metadata.with_canonical_defaults().merged(patch);
        slot.last_modified = self.next_modified(slot.last_modified);

        self.store_slot(slots, key, &slot)?;
        tracing::info!(slot_key = %key, "Updated save slot metadata");
        Ok(Some(slot))
    }

    /// Summaries for a save list, most recently modified first.
    pub async fn list_summaries(&self) -> Vec<SlotSummary> {
        let mut summaries: Vec<SlotSummary> = self
            .read_all_slots()
            .await
            .into_iter()
            .map(|(key, slot)| SlotSummary::from_slot(key, &slot))
            .collect();
        summaries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        summaries
    }

    /// `now`, but never earlier than `previous`.
    pub fn next_modified(&self, previous: i64) -> i64 {
        self.clock.now().timestamp_millis().max(previous)
    }

    /// The mapping a write starts from; `None` when the medium is absent.
    ///
    /// Must be called with `write_lock` held.
    fn read_mapping(&self, key: &SlotKey) -> Result<Option<Map<String, Value>>, SaveError> {
        match read_record(self.storage.as_ref(), storage_keys::SAVE_SLOTS) {
            RecordRead::Found(Value::Object(slots)) => Ok(Some(slots)),
            RecordRead::Found(_) => {
                tracing::warn!("Save list is not an object, replacing it");
                Ok(Some(Map::new()))
            }
            RecordRead::Empty => Ok(Some(Map::new())),
            RecordRead::Unavailable => Ok(None),
            // Writing now would replace every other slot with nothing
            RecordRead::Failed(e) => Err(SaveError::persistence(key.as_str(), e)),
        }
    }

    /// Must be called with `write_lock` held.
    fn store_slot(
        &self,
        mut slots: Map<String, Value>,
        key: &SlotKey,
        slot: &GameSaveSlot,
    ) -> Result<(), SaveError> {
        let value = serde_json::to_value(slot).map_err(|e| SaveError::persistence(key.as_str(), e))?;
        slots.insert(key.to_string(), value);

        write_record(
            self.storage.as_ref(),
            storage_keys::SAVE_SLOTS,
            &slots,
            key.as_str(),
        )?;
        tracing::debug!(slot_key = %key, last_modified = slot.last_modified, "Save slot written");
        Ok(())
    }

    fn load_slots(&self) -> Map<String, Value> {
        match read_record_value(self.storage.as_ref(), storage_keys::SAVE_SLOTS) {
            Some(Value::Object(slots)) => slots,
            Some(_) => {
                tracing::warn!("Save list is not an object, treating as empty");
                Map::new()
            }
            None => Map::new(),
        }
    }

    fn decode_slot(&self, key: &str, mut raw: Value) -> Option<GameSaveSlot> {
        let mut metadata_missing = true;
        if let Value::Object(fields) = &mut raw {
            // Older clients wrote explicit nulls where fields were unset
            fields.retain(|_, value| !value.is_null());
            if let Some(Value::Object(metadata)) = fields.get_mut("metadata") {
                metadata.retain(|_, value| !value.is_null());
                metadata_missing = false;
            }
        }

        let mut slot: GameSaveSlot = match serde_json::from_value(raw) {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(slot_key = key, error = %e, "Skipping corrupt save slot");
                return None;
            }
        };

        if metadata_missing {
            let date = datetime_from_millis(slot.last_modified)
                .filter(|_| slot.last_modified != 0)
                .unwrap_or_else(|| self.clock.now());
            slot.metadata =
                GameMetadata::new(GameMetadata::dated_title(date), DEFAULT_STORY_DESCRIPTION);
        }
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::platform::{MemoryStorageProvider, UnavailableStorageProvider};
    use crate::ports::outbound::{MockClockPort, StorageError};
    use chrono::{TimeZone, Utc};
    use herostory_domain::{StoryAction, StoryEntry};
    use serde_json::json;

    const T0: i64 = 1_714_557_600_000; // 2024-05-01T10:00:00Z

    fn clock_at(millis: i64) -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc.timestamp_millis_opt(millis).unwrap()))
    }

    fn store_with(storage: &MemoryStorageProvider, now: i64) -> SaveSlotStore {
        SaveSlotStore::new(Arc::new(storage.clone()), clock_at(now))
    }

    fn key(value: &str) -> SlotKey {
        SlotKey::parse(value).unwrap()
    }

    fn sample_slot(title: &str, last_modified: i64) -> GameSaveSlot {
        let mut metadata = GameMetadata::new(title, "Описание");
        metadata.keywords = "замок,дракон".into();
        metadata.player_name = "Ольга".into();
        GameSaveSlot::new(
            &[
                StoryEntry::narration("Над равниной встаёт солнце."),
                StoryEntry::player(StoryAction::Act, "Игрок действует: \"иду на север\""),
            ],
            metadata,
            last_modified,
        )
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);
        let slot = sample_slot("Рассвет", T0 - 5);

        store.write_slot(&key("save_1"), &slot).await.unwrap();

        let back = store.read_slot(&key("save_1")).await.unwrap();
        assert_eq!(back, slot);
        assert_eq!(back.last_modified, T0 - 5);
    }

    #[tokio::test]
    async fn missing_slot_reads_as_none() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);

        assert!(store.read_slot(&key("save_404")).await.is_none());
        assert!(store.read_all_slots().await.is_empty());
    }

    #[tokio::test]
    async fn write_replaces_only_its_key() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);

        store.write_slot(&key("a"), &sample_slot("A", 1)).await.unwrap();
        store.write_slot(&key("b"), &sample_slot("B", 2)).await.unwrap();
        store.write_slot(&key("a"), &sample_slot("A2", 3)).await.unwrap();

        let all = store.read_all_slots().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[&key("a")].metadata.story_title, "A2");
        assert_eq!(all[&key("b")].metadata.story_title, "B");
    }

    #[tokio::test]
    async fn truncated_json_reads_as_empty() {
        let storage = MemoryStorageProvider::new();
        storage.seed(storage_keys::SAVE_SLOTS, r#"{"save_1": {"log": ["#);
        let store = store_with(&storage, T0);

        assert!(store.read_all_slots().await.is_empty());
        assert!(store.read_slot(&key("save_1")).await.is_none());
    }

    #[tokio::test]
    async fn non_object_mapping_reads_as_empty_and_is_replaced_on_write() {
        let storage = MemoryStorageProvider::new();
        storage.seed(storage_keys::SAVE_SLOTS, "[1, 2, 3]");
        let store = store_with(&storage, T0);

        assert!(store.read_all_slots().await.is_empty());

        store.write_slot(&key("save_1"), &sample_slot("A", 1)).await.unwrap();
        assert_eq!(store.read_all_slots().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_slot_is_skipped_and_preserved() {
        let storage = MemoryStorageProvider::new();
        storage.seed(
            storage_keys::SAVE_SLOTS,
            r#"{"broken": "not a slot", "ok": {"log": ["Жили-были"], "metadata": {"storyTitle": "Сказка", "storyDescription": "Старая"}, "lastModified": 10}}"#,
        );
        let store = store_with(&storage, T0);

        let all = store.read_all_slots().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[&key("ok")].log.normalize().len(), 1);

        store.write_slot(&key("new"), &sample_slot("Новая", 20)).await.unwrap();

        let raw: Value = serde_json::from_str(&storage.raw(storage_keys::SAVE_SLOTS).unwrap()).unwrap();
        assert_eq!(raw["broken"], json!("not a slot"));
        assert!(raw.get("ok").is_some());
        assert!(raw.get("new").is_some());
    }

    #[tokio::test]
    async fn slot_without_metadata_gets_a_dated_title() {
        let storage = MemoryStorageProvider::new();
        storage.seed(
            storage_keys::SAVE_SLOTS,
            &json!({"legacy": {"log": ["a", "b"], "lastModified": T0}}).to_string(),
        );
        let store = store_with(&storage, T0);

        let slot = store.read_slot(&key("legacy")).await.unwrap();

        assert_eq!(slot.metadata.story_title, "История от 01.05.2024");
        assert_eq!(slot.metadata.story_description, DEFAULT_STORY_DESCRIPTION);
        assert!(!slot.metadata.is_published);
    }

    #[tokio::test]
    async fn null_fields_are_treated_as_absent() {
        let storage = MemoryStorageProvider::new();
        storage.seed(
            storage_keys::SAVE_SLOTS,
            &json!({"s": {
                "log": [],
                "metadata": {"storyTitle": "Т", "storyDescription": "О", "keywords": null},
                "lastModified": null
            }})
            .to_string(),
        );
        let store = store_with(&storage, T0);

        let slot = store.read_slot(&key("s")).await.unwrap();
        assert_eq!(slot.metadata.keywords, "");
        assert_eq!(slot.last_modified, 0);
    }

    #[tokio::test]
    async fn update_metadata_on_missing_key_is_not_found() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);

        let err = store
            .update_metadata(&key("save_404"), &MetadataPatch::published(true))
            .await
            .unwrap_err();

        assert_eq!(err, SaveError::SlotNotFound(key("save_404")));
    }

    #[tokio::test]
    async fn publishing_preserves_other_fields_and_bumps_last_modified() {
        let storage = MemoryStorageProvider::new();
        store_with(&storage, T0)
            .write_slot(&key("save_1"), &sample_slot("Рассвет", T0))
            .await
            .unwrap();

        let later = store_with(&storage, T0 + 60_000);
        let updated = later
            .update_metadata(&key("save_1"), &MetadataPatch::published(true))
            .await
            .unwrap()
            .unwrap();

        assert!(updated.metadata.is_published);
        assert_eq!(updated.metadata.story_title, "Рассвет");
        assert_eq!(updated.metadata.keywords, "замок,дракон");
        assert_eq!(updated.metadata.player_name, "Ольга");
        assert_eq!(updated.last_modified, T0 + 60_000);
        assert_eq!(later.read_slot(&key("save_1")).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_metadata_fills_blank_title_before_patching() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);
        let mut slot = sample_slot("", T0);
        slot.metadata.story_description = String::new();
        store.write_slot(&key("s"), &slot).await.unwrap();

        let updated = store
            .update_metadata(&key("s"), &MetadataPatch::published(true))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.metadata.story_title, herostory_domain::DEFAULT_STORY_TITLE);
        assert_eq!(updated.metadata.story_description, DEFAULT_STORY_DESCRIPTION);
    }

    #[tokio::test]
    async fn last_modified_never_moves_backwards() {
        let storage = MemoryStorageProvider::new();
        store_with(&storage, T0)
            .write_slot(&key("s"), &sample_slot("A", T0))
            .await
            .unwrap();

        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.timestamp_millis_opt(T0 - 3_600_000).unwrap());
        let store = SaveSlotStore::new(Arc::new(storage.clone()), Arc::new(clock));

        let updated = store
            .update_metadata(&key("s"), &MetadataPatch::published(true))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.last_modified, T0);
    }

    #[tokio::test]
    async fn unavailable_medium_makes_writes_silent_no_ops() {
        let store = SaveSlotStore::new(Arc::new(UnavailableStorageProvider), clock_at(T0));

        store.write_slot(&key("s"), &sample_slot("A", T0)).await.unwrap();

        assert!(store.read_slot(&key("s")).await.is_none());
        assert!(store.read_all_slots().await.is_empty());
        assert_eq!(
            store
                .update_metadata(&key("s"), &MetadataPatch::published(true))
                .await,
            Ok(None)
        );
    }

    /// Medium that exists but cannot be read.
    struct UnreadableStorage;

    impl StorageProvider for UnreadableStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::io("read", "disk error"))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_read_during_a_write_is_a_persistence_failure() {
        let store = SaveSlotStore::new(Arc::new(UnreadableStorage), clock_at(T0));

        let update = store
            .update_metadata(&key("s"), &MetadataPatch::published(true))
            .await
            .unwrap_err();
        let write = store
            .write_slot(&key("s"), &sample_slot("A", T0))
            .await
            .unwrap_err();

        for err in [update, write] {
            assert!(matches!(err, SaveError::PersistenceFailure { ref key, .. } if key == "s"));
        }
        assert!(store.read_all_slots().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_write_is_surfaced_and_keeps_previous_state() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);
        store.write_slot(&key("s"), &sample_slot("Старое", T0)).await.unwrap();
        storage.reject_writes("quota exceeded");

        let err = store
            .write_slot(&key("s"), &sample_slot("Новое", T0 + 1))
            .await
            .unwrap_err();

        assert!(matches!(err, SaveError::PersistenceFailure { ref key, .. } if key == "s"));
        assert_eq!(
            store.read_slot(&key("s")).await.unwrap().metadata.story_title,
            "Старое"
        );
    }

    #[tokio::test]
    async fn summaries_are_newest_first() {
        let storage = MemoryStorageProvider::new();
        let store = store_with(&storage, T0);
        store.write_slot(&key("old"), &sample_slot("Старая", 100)).await.unwrap();
        store.write_slot(&key("new"), &sample_slot("Новая", 300)).await.unwrap();
        store.write_slot(&key("mid"), &sample_slot("Средняя", 200)).await.unwrap();

        let titles: Vec<_> = store
            .list_summaries()
            .await
            .into_iter()
            .map(|s| s.title)
            .collect();

        assert_eq!(titles, vec!["Новая", "Средняя", "Старая"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_keep_every_slot() {
        let storage = MemoryStorageProvider::new();
        let store = Arc::new(store_with(&storage, T0));

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .write_slot(&SlotKey::from_millis(i), &sample_slot("x", i))
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        assert_eq!(store.read_all_slots().await.len(), 16);
    }
}
