//! Planting events
//!
//! The submission controller publishes what happened to a batch; screens that
//! care (the dashboard's queue tab highlight, the report binary) subscribe.

use innofarms_shared::FarmId;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantingEvent {
    /// A batch was accepted by the backend
    CropsPlanted {
        farm_id: FarmId,
        immediate: usize,
        queued: usize,
    },
    /// Part of a batch is waiting for shelves to free up
    CropsQueued { farm_id: FarmId, cycle_ids: Vec<i64> },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlantingEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlantingEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers. Returns how many received it.
    pub fn publish(&self, event: PlantingEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(?event, "No subscribers for planting event");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
