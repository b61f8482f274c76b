//! Profile Store - user profile and achievement state
//!
//! Both are independent top-level records next to the save list and follow
//! the same read/write policy as save slots.

use std::sync::Arc;

use herostory_domain::{merge_achievements, Achievement, UserProfile};

use super::records::{read_record_value, write_record};
use crate::application::SaveError;
use crate::ports::outbound::{storage_keys, StorageProvider};
use crate::state::Platform;

pub struct ProfileStore {
    storage: Arc<dyn StorageProvider>,
}

impl ProfileStore {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    pub fn from_platform(platform: &Platform) -> Self {
        Self::new(platform.storage())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), SaveError> {
        write_record(
            self.storage.as_ref(),
            storage_keys::USER_PROFILE,
            profile,
            storage_keys::USER_PROFILE,
        )
    }

    /// The stored profile; `None` when absent or unreadable.
    pub fn load_profile(&self) -> Option<UserProfile> {
        let value = read_record_value(self.storage.as_ref(), storage_keys::USER_PROFILE)?;
        match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user profile is corrupt, ignoring it");
                None
            }
        }
    }

    pub fn save_achievements(&self, achievements: &[Achievement]) -> Result<(), SaveError> {
        write_record(
            self.storage.as_ref(),
            storage_keys::ACHIEVEMENTS,
            achievements,
            storage_keys::ACHIEVEMENTS,
        )
    }

    /// The catalogue with stored state overlaid. Never fails.
    pub fn load_achievements(&self, catalogue: &[Achievement]) -> Vec<Achievement> {
        let stored = read_record_value(self.storage.as_ref(), storage_keys::ACHIEVEMENTS)
            .unwrap_or_default();
        if !stored.is_null() && !stored.is_array() {
            tracing::warn!("Stored achievements are not a list, using the catalogue");
        }
        merge_achievements(catalogue, &stored)
    }
}
