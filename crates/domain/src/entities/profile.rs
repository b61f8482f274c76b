//! User profile and achievement state.
//!
//! Both live next to the save slots as independent top-level records.
//! Only persistence and catalogue merging live here; deciding when an
//! achievement unlocks is the UI's concern.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub game_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Progress needed to unlock; `None` for one-shot achievements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<u32>,
}

impl Achievement {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            unlocked: false,
            progress: None,
            goal: None,
        }
    }

    pub fn with_goal(mut self, goal: u32) -> Self {
        self.goal = Some(goal);
        self
    }

    fn with_progress_default(mut self) -> Self {
        self.progress = Some(self.progress.unwrap_or(0));
        self
    }
}

/// Overlay stored achievement state onto the current catalogue.
///
/// Every catalogue entry appears exactly once, in catalogue order. A stored
/// record with a matching id contributes its `unlocked` flag and, when it is
/// a number, its `progress` (otherwise 0). Stored ids missing from the
/// catalogue are dropped. Anything but an array in `stored` yields the
/// catalogue with progress defaulted to 0.
pub fn merge_achievements(catalogue: &[Achievement], stored: &serde_json::Value) -> Vec<Achievement> {
    let stored = stored.as_array().map(Vec::as_slice).unwrap_or_default();

    catalogue
        .iter()
        .map(|initial| {
            let found = stored
                .iter()
                .find(|record| record.get("id").and_then(|id| id.as_str()) == Some(&*initial.id));

            match found {
                Some(record) => Achievement {
                    unlocked: record
                        .get("unlocked")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false),
                    progress: Some(
                        record
                            .get("progress")
                            .and_then(|v| v.as_f64())
                            // float-to-int casts saturate; NaN maps to 0
                            .map(|p| p as u32)
                            .unwrap_or(0),
                    ),
                    ..initial.clone()
                },
                None => initial.clone().with_progress_default(),
            }
        })
        .collect()
}
