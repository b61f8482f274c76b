//! Autosave - periodic best-effort saving of a session
//!
//! The task saves the session on a fixed interval for as long as its
//! [`AutosaveHandle`] is alive. Failed saves are logged and reported on the
//! optional notice channel; the timer keeps running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::GameSession;
use crate::application::SaveError;

/// Default autosave period.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(5_000);

/// Owns a running autosave task. Dropping it stops the task.
pub struct AutosaveHandle {
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Stop the task and wait for it to finish.
    ///
    /// No save starts after this returns.
    pub async fn stop(mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Autosave task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Start saving `session` every `interval`.
///
/// The first save happens one full interval after the call.
pub fn spawn_autosave(
    session: Arc<Mutex<GameSession>>,
    interval: Duration,
    notices: Option<mpsc::UnboundedSender<SaveError>>,
) -> AutosaveHandle {
    let cancel_token = CancellationToken::new();
    let task = tokio::spawn(autosave_loop(
        session,
        interval,
        notices,
        cancel_token.clone(),
    ));

    AutosaveHandle {
        cancel_token,
        task: Some(task),
    }
}

async fn autosave_loop(
    session: Arc<Mutex<GameSession>>,
    interval: Duration,
    notices: Option<mpsc::UnboundedSender<SaveError>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    tracing::debug!(interval_ms = interval.as_millis() as u64, "Autosave started");

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let mut guard = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            guard = session.lock() => guard,
        };

        if let Err(e) = guard.persist().await {
            tracing::warn!(slot_key = %guard.key(), error = %e, "Autosave failed");
            if let Some(notices) = &notices {
                // Receiver gone means nobody is listening any more
                let _ = notices.send(e);
            }
        }
    }

    tracing::debug!("Autosave stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{SaveSlotStore, SessionServices};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::platform::MemoryStorageProvider;
    use crate::ports::outbound::{storage_keys, ClockPort, MockStoryGenerator};
    use chrono::{TimeZone, Utc};
    use herostory_domain::{MetadataPatch, SlotKey};
    use serde_json::json;

    const T0: i64 = 1_714_557_600_000;

    async fn session_over(storage: &MemoryStorageProvider) -> Arc<Mutex<GameSession>> {
        storage.seed(
            storage_keys::SAVE_SLOTS,
            &json!({"save_1": {
                "log": ["Город спит."],
                "metadata": {"storyTitle": "Ночь", "storyDescription": "Тихо"},
                "lastModified": T0 - 1
            }})
            .to_string(),
        );
        let clock: Arc<dyn ClockPort> = Arc::new(FixedClock(Utc.timestamp_millis_opt(T0).unwrap()));
        let services = SessionServices::new(
            Arc::new(SaveSlotStore::new(Arc::new(storage.clone()), Arc::clone(&clock))),
            Arc::new(MockStoryGenerator::new()),
            clock,
        );
        let session = GameSession::load(services, SlotKey::parse("save_1").unwrap())
            .await
            .unwrap();
        Arc::new(Mutex::new(session))
    }

    fn saved_title(storage: &MemoryStorageProvider) -> String {
        let raw: serde_json::Value =
            serde_json::from_str(&storage.raw(storage_keys::SAVE_SLOTS).unwrap()).unwrap();
        raw["save_1"]["metadata"]["storyTitle"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn saves_after_each_interval() {
        let storage = MemoryStorageProvider::new();
        let session = session_over(&storage).await;
        let handle = spawn_autosave(Arc::clone(&session), Duration::from_secs(5), None);

        // Change in-memory state without saving
        storage.reject_writes("busy");
        let _ = session
            .lock()
            .await
            .update_metadata(&MetadataPatch {
                story_title: Some("Рассвет".into()),
                ..MetadataPatch::default()
            })
            .await;
        storage.accept_writes();
        assert_eq!(saved_title(&storage), "Ночь");

        tokio::time::sleep(Duration::from_millis(5_100)).await;

        assert_eq!(saved_title(&storage), "Рассвет");
        assert_eq!(session.lock().await.last_modified(), T0);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_save_waits_a_full_interval() {
        let storage = MemoryStorageProvider::new();
        let session = session_over(&storage).await;
        let before = storage.raw(storage_keys::SAVE_SLOTS);
        let handle = spawn_autosave(Arc::clone(&session), Duration::from_secs(5), None);

        tokio::time::sleep(Duration::from_millis(4_000)).await;

        assert_eq!(storage.raw(storage_keys::SAVE_SLOTS), before);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_and_ticking_continues() {
        let storage = MemoryStorageProvider::new();
        let session = session_over(&storage).await;
        storage.reject_writes("quota exceeded");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_autosave(Arc::clone(&session), Duration::from_secs(5), Some(tx));

        tokio::time::sleep(Duration::from_millis(10_100)).await;

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert!(matches!(first, SaveError::PersistenceFailure { .. }));
        assert_eq!(first, second);
        assert!(handle.is_running());
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_saves_after_stop() {
        let storage = MemoryStorageProvider::new();
        let session = session_over(&storage).await;
        storage.reject_writes("quota exceeded");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_autosave(Arc::clone(&session), Duration::from_secs(5), Some(tx));

        handle.stop().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        // Sender dropped with the task, nothing was ever sent
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels_the_task() {
        let storage = MemoryStorageProvider::new();
        let session = session_over(&storage).await;
        storage.reject_writes("quota exceeded");
        let (tx, mut rx) = mpsc::unbounded_channel();

        drop(spawn_autosave(Arc::clone(&session), Duration::from_secs(5), Some(tx)));
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(Arc::strong_count(&session), 1);
    }
}
