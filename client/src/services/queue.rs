//! Pending crop cycle queue

use std::sync::Arc;

use innofarms_shared::{project_queued_cycle, FarmId, QueueProjection, QueuedCycleView};

use crate::error::AppResult;
use crate::external::FarmApi;

/// Fetches the pending queue for a farm. Never cached; every open or
/// refresh goes back to the backend.
#[derive(Clone)]
pub struct QueueService {
    api: Arc<dyn FarmApi>,
}

impl QueueService {
    pub fn new(api: Arc<dyn FarmApi>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, farm_id: i64) -> AppResult<Vec<QueuedCycleView>> {
        let farm_id = FarmId::new(farm_id)?;
        let cycles = self.api.pending_cycles(farm_id).await?;
        tracing::debug!(%farm_id, pending = cycles.len(), "Fetched crop queue");
        Ok(cycles)
    }

    /// Fetch the queue and project each entry for display, in queue order
    pub async fn projections(&self, farm_id: i64) -> AppResult<Vec<QueueProjection>> {
        let mut cycles = self.fetch(farm_id).await?;
        cycles.sort_by_key(|c| c.queue_position.unwrap_or(u32::MAX));
        Ok(cycles.iter().map(project_queued_cycle).collect())
    }
}

/// Queue panel view state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueuePanel {
    pub expanded: bool,
    pub entries: Vec<QueueProjection>,
}

impl QueuePanel {
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Reload entries from the backend, keeping the expand state
    pub async fn refresh(&mut self, service: &QueueService, farm_id: i64) -> AppResult<()> {
        self.entries = service.projections(farm_id).await?;
        Ok(())
    }
}
