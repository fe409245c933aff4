//! Shelf reallocation panel controller

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use innofarms_shared::{
    AllocationRow, AllocationValidity, CropTypeCapacity, FarmId, ReallocationDraft,
    ReallocationRequest, ValidationError,
};

use crate::error::{AppError, AppResult};
use crate::external::FarmApi;
use crate::services::in_flight::InFlight;

/// Result of pressing save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed; the panel closes without a request
    NoChanges,
    /// The backend accepted the change, with its confirmation message
    Saved { message: Option<String> },
}

pub struct ReallocationPanel {
    farm_id: FarmId,
    api: Arc<dyn FarmApi>,
    draft: ReallocationDraft,
    saving: AtomicBool,
}

impl ReallocationPanel {
    pub fn open(
        farm_id: i64,
        api: Arc<dyn FarmApi>,
        rows: Vec<AllocationRow>,
        capacities: BTreeMap<String, CropTypeCapacity>,
    ) -> AppResult<Self> {
        Ok(Self {
            farm_id: FarmId::new(farm_id)?,
            api,
            draft: ReallocationDraft::new(rows, capacities),
            saving: AtomicBool::new(false),
        })
    }

    pub fn rows(&self) -> &[AllocationRow] {
        self.draft.rows()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Set a cycle's shelf count; values below one become one
    pub fn set_shelves(&mut self, cycle_id: i64, value: i64) -> AppResult<u32> {
        Ok(self.draft.set_shelves(cycle_id, value)?)
    }

    /// Commit the raw text of a cycle's input when it loses focus
    pub fn blur(&mut self, cycle_id: i64, input: &str) -> AppResult<u32> {
        Ok(self.draft.commit_input(cycle_id, input)?)
    }

    pub fn validity(&self) -> AllocationValidity {
        self.draft.validity()
    }

    /// Whether the save action is enabled
    pub fn can_save(&self) -> bool {
        !self.is_saving() && self.draft.can_save()
    }

    /// Save changed rows.
    ///
    /// An unchanged draft short-circuits without a request. An invalid draft
    /// is rejected locally. A server rejection is returned with the server's
    /// message and the draft is left as it was. Dropping the returned future
    /// mid-request clears the saving flag.
    pub async fn save(&mut self) -> AppResult<SaveOutcome> {
        if !self.draft.has_changes() {
            tracing::debug!(farm_id = %self.farm_id, "No allocation changes to save");
            return Ok(SaveOutcome::NoChanges);
        }

        let validity = self.draft.validity();
        if !validity.is_valid {
            return Err(ValidationError::OverAllocated {
                crop_types: validity.over_allocated_types(),
            }
            .into());
        }

        let request = ReallocationRequest {
            farm_id: self.farm_id,
            changed_allocation: self.draft.changed_allocations(),
        };

        tracing::info!(
            farm_id = %self.farm_id,
            changed = request.changed_allocation.len(),
            "Saving shelf reallocation"
        );

        let saving = InFlight::acquire(&self.saving).ok_or(AppError::SaveInProgress)?;
        let result = self.api.update_allocation(&request).await;
        drop(saving);

        let message = result.map_err(|e| {
            tracing::warn!(farm_id = %self.farm_id, error = %e, "Shelf reallocation rejected");
            e
        })?;
        self.draft.mark_saved();
        Ok(SaveOutcome::Saved { message })
    }
}
