//! Durable client state shared with the dashboard
//!
//! Holds the `recentlyQueued` flag: set when a planting produced queued
//! cycles, read and cleared by whatever screen shows the queue tab.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::{AppError, AppResult};
use crate::events::PlantingEvent;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    #[serde(default)]
    pub recently_queued: bool,
    #[serde(default)]
    pub queued_at: Option<DateTime<Utc>>,
}

/// JSON file backed store for [`ClientState`]
#[derive(Debug, Clone)]
pub struct ClientStateStore {
    path: PathBuf,
}

impl ClientStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state file. A missing file is an empty state.
    pub async fn load(&self) -> AppResult<ClientState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::State(format!("Invalid state file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientState::default()),
            Err(e) => Err(AppError::State(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    pub async fn save(&self, state: &ClientState) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::State(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| AppError::State(format!("Failed to encode state: {}", e)))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| AppError::State(format!("Failed to write {}: {}", self.path.display(), e)))
    }

    pub async fn mark_recently_queued(&self) -> AppResult<()> {
        let mut state = self.load().await?;
        state.recently_queued = true;
        state.queued_at = Some(Utc::now());
        self.save(&state).await
    }

    /// Read the flag and clear it
    pub async fn take_recently_queued(&self) -> AppResult<bool> {
        let mut state = self.load().await?;
        if !state.recently_queued {
            return Ok(false);
        }
        state.recently_queued = false;
        state.queued_at = None;
        self.save(&state).await?;
        Ok(true)
    }
}

/// Persist the `recentlyQueued` flag for every queued planting.
///
/// Runs until the event bus is dropped.
pub async fn record_queue_events(
    mut events: broadcast::Receiver<PlantingEvent>,
    store: ClientStateStore,
) {
    loop {
        match events.recv().await {
            Ok(PlantingEvent::CropsQueued { farm_id, cycle_ids }) => {
                tracing::info!(%farm_id, queued = cycle_ids.len(), "Recording recently queued crops");
                if let Err(e) = store.mark_recently_queued().await {
                    tracing::error!(error = %e, "Failed to persist recently queued flag");
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Queue event recorder lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use innofarms_shared::FarmId;

    fn temp_store() -> ClientStateStore {
        let path = std::env::temp_dir()
            .join(format!("innofarms-state-{}", uuid::Uuid::new_v4()))
            .join("client-state.json");
        ClientStateStore::new(path)
    }

    #[tokio::test]
    async fn test_missing_file_is_default_state() {
        let store = temp_store();
        assert_eq!(store.load().await.unwrap(), ClientState::default());
        assert!(!store.take_recently_queued().await.unwrap());
    }

    #[tokio::test]
    async fn test_flag_round_trip() {
        let store = temp_store();
        store.mark_recently_queued().await.unwrap();

        let contents = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(contents.contains("\"recentlyQueued\": true"));

        assert!(store.take_recently_queued().await.unwrap());
        assert!(!store.take_recently_queued().await.unwrap());
    }

    #[tokio::test]
    async fn test_recorder_persists_queued_events_only() {
        let store = temp_store();
        let bus = EventBus::new();
        let recorder = tokio::spawn(record_queue_events(bus.subscribe(), store.clone()));
        let farm_id = FarmId::new(3).unwrap();

        bus.publish(PlantingEvent::CropsPlanted {
            farm_id,
            immediate: 2,
            queued: 1,
        });
        bus.publish(PlantingEvent::CropsQueued {
            farm_id,
            cycle_ids: vec![17],
        });
        drop(bus);
        recorder.await.unwrap();

        assert!(store.load().await.unwrap().recently_queued);
    }
}
