//! In-memory [`FarmApi`] for controller tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use innofarms_shared::{
    FarmId, PlantCropsRequest, PlantingOutcome, QueuedCycleView, ReallocationRequest,
    ShelfAvailabilityData,
};
use tokio::sync::Notify;

use super::{FarmApi, PlantingResponse};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub(crate) struct FakeFarmApi {
    pub availability: Mutex<ShelfAvailabilityData>,
    pub outcome: Mutex<PlantingOutcome>,
    pub pending: Mutex<Vec<QueuedCycleView>>,
    pub failure: Mutex<Option<String>>,
    pub save_message: Mutex<Option<String>>,
    pub plant_requests: Mutex<Vec<PlantCropsRequest>>,
    pub reallocation_requests: Mutex<Vec<ReallocationRequest>>,
    pub availability_calls: AtomicUsize,
    pub pending_calls: AtomicUsize,
    /// When set, `plant_crops`, `shelf_availability` and `update_allocation`
    /// wait for a notification
    pub gate: Option<Arc<Notify>>,
}

impl FakeFarmApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn plant_call_count(&self) -> usize {
        self.plant_requests.lock().unwrap().len()
    }

    fn check_failure(&self) -> AppResult<()> {
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(AppError::Transport {
                status: Some(500),
                message,
            }),
            None => Ok(()),
        }
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl FarmApi for FakeFarmApi {
    async fn shelf_availability(&self, _farm_id: FarmId) -> AppResult<ShelfAvailabilityData> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        self.check_failure()?;
        Ok(self.availability.lock().unwrap().clone())
    }

    async fn plant_crops(&self, request: &PlantCropsRequest) -> AppResult<PlantingResponse> {
        self.plant_requests.lock().unwrap().push(request.clone());
        self.wait_for_gate().await;
        self.check_failure()?;
        Ok(PlantingResponse {
            outcome: self.outcome.lock().unwrap().clone(),
            message: Some("Crops planted".to_string()),
        })
    }

    async fn pending_cycles(&self, _farm_id: FarmId) -> AppResult<Vec<QueuedCycleView>> {
        self.pending_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn update_allocation(&self, request: &ReallocationRequest) -> AppResult<Option<String>> {
        self.reallocation_requests.lock().unwrap().push(request.clone());
        self.wait_for_gate().await;
        self.check_failure()?;
        Ok(self.save_message.lock().unwrap().clone())
    }
}
