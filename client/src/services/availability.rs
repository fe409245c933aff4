//! Shelf availability fetching

use std::sync::Arc;

use innofarms_shared::{normalize_availability, FarmId, ShelfAvailabilityData};

use crate::error::AppResult;
use crate::external::FarmApi;

/// Fetches and normalizes shelf occupancy for a farm
#[derive(Clone)]
pub struct ShelfAvailabilityService {
    api: Arc<dyn FarmApi>,
}

impl ShelfAvailabilityService {
    pub fn new(api: Arc<dyn FarmApi>) -> Self {
        Self { api }
    }

    /// Fetch current shelf availability.
    ///
    /// A non-positive farm id is a no-op and returns `None` without calling
    /// the backend. Retry by calling again.
    pub async fn fetch(&self, farm_id: i64) -> AppResult<Option<ShelfAvailabilityData>> {
        let Ok(farm_id) = FarmId::new(farm_id) else {
            tracing::debug!(farm_id, "Skipping shelf availability fetch for invalid farm");
            return Ok(None);
        };

        let raw = self.api.shelf_availability(farm_id).await?;
        let data = normalize_availability(raw);

        tracing::debug!(
            %farm_id,
            available = data.shelves.total_available,
            occupied = data.shelves.total_occupied,
            "Fetched shelf availability"
        );
        Ok(Some(data))
    }
}
