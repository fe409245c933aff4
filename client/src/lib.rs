//! INNOFarms planting client
//!
//! Workflow controllers for assigning crop batches to rack shelves, watching
//! the pending queue and resizing shelf allocations, talking to the
//! INNOFarms REST backend.

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod services;
pub mod state;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, AppResult};

use events::EventBus;
use external::{FarmApi, HttpFarmApi};
use state::{record_queue_events, ClientStateStore};
use tokio::task::JoinHandle;

/// Shared handles for the workflow controllers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn FarmApi>,
    pub config: Arc<Config>,
    pub events: EventBus,
    pub store: ClientStateStore,
    /// Task persisting `recentlyQueued` from the event bus. It runs until
    /// every clone of the bus is dropped.
    pub recorder: Arc<JoinHandle<()>>,
}

impl AppState {
    /// Build the API client and start the queue event recorder.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Configuration(format!("No Tokio runtime available: {}", e)))?;

        let api = HttpFarmApi::from_config(&config.api)?;
        let events = EventBus::new();
        let store = ClientStateStore::new(&config.state.path);
        let recorder = runtime.spawn(record_queue_events(events.subscribe(), store.clone()));

        Ok(Self {
            api: Arc::new(api),
            store,
            config: Arc::new(config),
            events,
            recorder: Arc::new(recorder),
        })
    }
}
