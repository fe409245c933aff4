//! Planting workflow controller
//!
//! One [`PlantingWorkflow`] backs one shelf-selection modal. Opening it
//! starts a fresh selection for the incoming crop batch; availability is
//! fetched into the open session; submission turns the finished selection
//! into a planting request and publishes the outcome on the event bus.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use innofarms_shared::{
    build_planting_request, CropBatchItem, CropSelection, FarmId, PlantingOutcome, Shelf,
    ShelfAvailabilityData, ShelfRef, ShelfSelection, ViewMode,
};
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::events::{EventBus, PlantingEvent};
use crate::external::FarmApi;
use crate::services::availability::ShelfAvailabilityService;
use crate::services::in_flight::InFlight;

/// State of one open modal. Dropped on close, reopen or successful submit.
#[derive(Debug, Clone)]
struct WorkflowSession {
    generation: u64,
    selection: ShelfSelection,
    availability: Option<ShelfAvailabilityData>,
    view_mode: ViewMode,
}

/// Read-only view of the open session for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub cursor: usize,
    pub selections: Vec<CropSelection>,
    pub all_selected: bool,
    pub view_mode: ViewMode,
    pub visible_shelves: Vec<Shelf>,
    pub duplicate_assignments: Vec<(ShelfRef, Vec<usize>)>,
}

pub struct PlantingWorkflow {
    farm_id: i64,
    api: Arc<dyn FarmApi>,
    availability: ShelfAvailabilityService,
    events: EventBus,
    session: Mutex<Option<WorkflowSession>>,
    generation: AtomicU64,
    planting: AtomicBool,
    fetching: AtomicBool,
}

impl PlantingWorkflow {
    pub fn new(farm_id: i64, api: Arc<dyn FarmApi>, events: EventBus) -> Self {
        Self {
            farm_id,
            availability: ShelfAvailabilityService::new(api.clone()),
            api,
            events,
            session: Mutex::new(None),
            generation: AtomicU64::new(0),
            planting: AtomicBool::new(false),
            fetching: AtomicBool::new(false),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// True while a submission is in flight
    pub fn is_planting(&self) -> bool {
        self.planting.load(Ordering::Acquire)
    }

    /// True while an availability fetch is in flight
    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Open the workflow for a crop batch, discarding any previous choices
    /// and any previously fetched shelves. Returns the session generation.
    pub async fn open(&self, batch: &[CropBatchItem]) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *self.session.lock().await = Some(WorkflowSession {
            generation,
            selection: ShelfSelection::new(batch),
            availability: None,
            view_mode: ViewMode::All,
        });
        tracing::debug!(farm_id = self.farm_id, crops = batch.len(), generation, "Opened planting workflow");
        generation
    }

    /// Close the workflow. Results of requests still in flight are dropped.
    pub async fn close(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.session.lock().await = None;
    }

    /// Fetch shelf availability into the open session.
    ///
    /// Selections are kept. Returns `false` when nothing was applied: a fetch
    /// was already running, the farm id is not valid, or the session was
    /// closed or reopened while the request was in flight.
    pub async fn refresh_availability(&self) -> AppResult<bool> {
        let generation = match self.session.lock().await.as_ref() {
            Some(session) => session.generation,
            None => return Err(AppError::WorkflowClosed),
        };

        let Some(_fetching) = InFlight::acquire(&self.fetching) else {
            tracing::debug!(farm_id = self.farm_id, "Shelf availability fetch already running");
            return Ok(false);
        };

        let Some(data) = self.availability.fetch(self.farm_id).await? else {
            return Ok(false);
        };

        let mut session = self.session.lock().await;
        match session.as_mut() {
            Some(session) if session.generation == generation => {
                session.availability = Some(data);
                Ok(true)
            }
            _ => {
                tracing::debug!(farm_id = self.farm_id, generation, "Discarding stale shelf availability");
                Ok(false)
            }
        }
    }

    /// Record a shelf for the crop under the cursor. Returns the new cursor.
    pub async fn select_shelf(&self, shelf: ShelfRef) -> AppResult<usize> {
        let mut session = self.session.lock().await;
        let session = session.as_mut().ok_or(AppError::WorkflowClosed)?;
        Ok(session.selection.select_shelf(shelf)?)
    }

    pub async fn jump_to(&self, index: usize) -> AppResult<()> {
        let mut session = self.session.lock().await;
        let session = session.as_mut().ok_or(AppError::WorkflowClosed)?;
        Ok(session.selection.jump_to(index)?)
    }

    pub async fn set_view_mode(&self, mode: ViewMode) -> AppResult<()> {
        let mut session = self.session.lock().await;
        let session = session.as_mut().ok_or(AppError::WorkflowClosed)?;
        session.view_mode = mode;
        Ok(())
    }

    pub async fn snapshot(&self) -> Option<WorkflowSnapshot> {
        let session = self.session.lock().await;
        session.as_ref().map(|s| WorkflowSnapshot {
            cursor: s.selection.cursor(),
            selections: s.selection.selections().to_vec(),
            all_selected: s.selection.all_selected(),
            view_mode: s.view_mode,
            visible_shelves: s
                .availability
                .as_ref()
                .map(|a| a.visible_shelves(s.view_mode).into_iter().cloned().collect())
                .unwrap_or_default(),
            duplicate_assignments: s.selection.duplicate_assignments(),
        })
    }

    /// Submit the selection for planting.
    ///
    /// Rejected locally, without a request, unless every crop has a shelf.
    /// Only one submission runs at a time. On failure the selection is kept
    /// so the operator can retry; on success the session is closed.
    pub async fn submit(&self) -> AppResult<PlantingOutcome> {
        let _planting = InFlight::acquire(&self.planting).ok_or(AppError::SubmissionInProgress)?;

        let (generation, request) = {
            let session = self.session.lock().await;
            let session = session.as_ref().ok_or(AppError::WorkflowClosed)?;
            let farm_id = FarmId::new(self.farm_id)?;
            (
                session.generation,
                build_planting_request(farm_id, session.selection.selections())?,
            )
        };

        tracing::info!(farm_id = self.farm_id, crops = request.crops.len(), "Submitting planting batch");

        let response = self.api.plant_crops(&request).await.map_err(|e| {
            tracing::warn!(farm_id = self.farm_id, error = %e, "Planting submission failed");
            e
        })?;
        let outcome = response.outcome;

        tracing::info!(
            farm_id = self.farm_id,
            immediate = outcome.immediate.len(),
            queued = outcome.queued.len(),
            "Planting batch accepted"
        );

        self.events.publish(PlantingEvent::CropsPlanted {
            farm_id: request.farm_id,
            immediate: outcome.immediate.len(),
            queued: outcome.queued.len(),
        });
        if outcome.has_queued() {
            self.events.publish(PlantingEvent::CropsQueued {
                farm_id: request.farm_id,
                cycle_ids: outcome.queued_cycle_ids(),
            });
        }

        let mut session = self.session.lock().await;
        if session.as_ref().map(|s| s.generation) == Some(generation) {
            *session = None;
        }

        Ok(outcome)
    }
}
