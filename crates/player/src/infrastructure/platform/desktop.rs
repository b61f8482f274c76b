//! Desktop platform implementations
//!
//! Provides the file-backed storage medium used by native builds.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use directories::ProjectDirs;

use crate::infrastructure::clock::SystemClock;
use crate::ports::outbound::{StorageError, StorageProvider};
use crate::state::Platform;

/// File name of the storage document inside the data directory.
const STORAGE_FILE: &str = "storage.json";

/// Desktop storage provider with file-based persistence
///
/// Stores key-value pairs in a JSON file at (unless a data dir is configured):
/// - Linux: ~/.config/herostory/storage.json
/// - macOS: ~/Library/Application Support/io.herostory.herostory/storage.json
/// - Windows: C:\Users\<User>\AppData\Roaming\herostory\herostory\config\storage.json
#[derive(Clone)]
pub struct DesktopStorageProvider {
    /// Path to the storage file
    storage_path: PathBuf,
    /// In-memory cache of stored values
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl DesktopStorageProvider {
    /// Storage in the platform config directory.
    pub fn from_project_dirs() -> Self {
        let storage_path = if let Some(dirs) = ProjectDirs::from("io", "herostory", "herostory") {
            dirs.config_dir().join(STORAGE_FILE)
        } else {
            // Fallback to current directory if project dirs unavailable
            PathBuf::from("herostory_storage.json")
        };
        Self::open(storage_path)
    }

    /// Storage in `dir/storage.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::open(dir.as_ref().join(STORAGE_FILE))
    }

    /// Open (or lazily create) the storage file at `storage_path`.
    ///
    /// An unreadable or unparsable file starts an empty cache; the file is
    /// only overwritten by the next successful save.
    pub fn open(storage_path: PathBuf) -> Self {
        let cache = if storage_path.exists() {
            match fs::read_to_string(&storage_path) {
                Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                    Ok(map) => map,
                    Err(e) => {
                        tracing::warn!("Failed to parse storage file: {}", e);
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read storage file: {}", e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!("Desktop storage initialized at: {:?}", storage_path);

        Self {
            storage_path,
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Write the whole cache to disk
    fn persist(&self, cache: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io("create_dir", e))?;
            }
        }

        let data =
            serde_json::to_string_pretty(cache).map_err(|e| StorageError::io("serialize", e))?;
        fs::write(&self.storage_path, data).map_err(|e| StorageError::io("write", e))
    }
}

impl StorageProvider for DesktopStorageProvider {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .cache
            .read()
            .map_err(|e| StorageError::io("read_lock", e))?;
        Ok(guard.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .cache
            .write()
            .map_err(|e| StorageError::io("write_lock", e))?;

        let previous = guard.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&guard) {
            // Keep the cache in step with the file
            match previous {
                Some(previous) => guard.insert(key.to_string(), previous),
                None => guard.remove(key),
            };
            tracing::error!(key, error = %e, "Failed to write storage file");
            return Err(e);
        }
        Ok(())
    }
}

/// Create platform services for desktop
///
/// `data_dir` overrides the platform config directory.
pub fn create_platform(data_dir: Option<&Path>) -> Platform {
    let storage = match data_dir {
        Some(dir) => DesktopStorageProvider::in_dir(dir),
        None => DesktopStorageProvider::from_project_dirs(),
    };
    Platform::new(storage, SystemClock::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = DesktopStorageProvider::in_dir(dir.path());

        storage.save("key", "value").unwrap();

        assert_eq!(storage.load("key").unwrap().as_deref(), Some("value"));
        assert_eq!(storage.load("missing").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        DesktopStorageProvider::in_dir(dir.path())
            .save("heroStoryUserProfile", r#"{"username":"olga"}"#)
            .unwrap();

        let reopened = DesktopStorageProvider::in_dir(dir.path());
        assert_eq!(
            reopened.load("heroStoryUserProfile").unwrap().as_deref(),
            Some(r#"{"username":"olga"}"#)
        );
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let nested = dir.path().join("a").join("b");
        let storage = DesktopStorageProvider::in_dir(&nested);

        storage.save("k", "v").unwrap();

        assert!(nested.join(STORAGE_FILE).exists());
    }

    #[test]
    fn unparsable_file_starts_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join(STORAGE_FILE), "{not json").unwrap();

        let storage = DesktopStorageProvider::in_dir(dir.path());

        assert_eq!(storage.load("anything").unwrap(), None);
    }

    #[test]
    fn failed_write_is_reported_and_rolled_back() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        // A directory where the file should be makes every write fail
        let blocked = dir.path().join("blocked");
        fs::create_dir_all(blocked.join(STORAGE_FILE)).unwrap();
        let storage = DesktopStorageProvider::in_dir(&blocked);

        let result = storage.save("k", "v");

        assert!(matches!(result, Err(StorageError::Io { operation: "write", .. })));
        assert_eq!(storage.load("k").unwrap(), None);
    }
}
