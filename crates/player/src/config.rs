//! Player configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::application::services::DEFAULT_AUTOSAVE_INTERVAL;

/// Directory holding `storage.json`; unset means the platform config dir.
pub const DATA_DIR_VAR: &str = "HEROSTORY_DATA_DIR";

/// Autosave period in milliseconds.
pub const AUTOSAVE_INTERVAL_VAR: &str = "HEROSTORY_AUTOSAVE_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub data_dir: Option<PathBuf>,
    pub autosave_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

impl PlayerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Missing or invalid values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup(DATA_DIR_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let autosave_interval = match lookup(AUTOSAVE_INTERVAL_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    tracing::warn!(
                        value = %raw,
                        "Invalid {}, using {} ms",
                        AUTOSAVE_INTERVAL_VAR,
                        DEFAULT_AUTOSAVE_INTERVAL.as_millis()
                    );
                    DEFAULT_AUTOSAVE_INTERVAL
                }
                Ok(ms) => Duration::from_millis(ms),
            },
            None => DEFAULT_AUTOSAVE_INTERVAL,
        };

        Self {
            data_dir,
            autosave_interval,
        }
    }
}
