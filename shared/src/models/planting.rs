//! Planting request and outcome models

use serde::{Deserialize, Serialize};

use crate::models::CropSelection;
use crate::types::FarmId;
use crate::validation::{validate_selection_complete, ValidationError};

/// One crop in the body of `POST /api/cropcycle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantCropItem {
    pub crop_name: String,
    pub crop_variety: String,
    pub crop_type: String,
    pub target_rack_id: i64,
    pub target_shelf_id: i64,
}

/// Body of `POST /api/cropcycle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantCropsRequest {
    pub farm_id: FarmId,
    pub crops: Vec<PlantCropItem>,
}

/// Build the planting payload from a completed selection.
///
/// Fails without producing a partial payload if any crop lacks a shelf.
pub fn build_planting_request(
    farm_id: FarmId,
    selections: &[CropSelection],
) -> Result<PlantCropsRequest, ValidationError> {
    validate_selection_complete(selections)?;

    let crops = selections
        .iter()
        .filter_map(|s| {
            s.selected_shelf.map(|shelf| PlantCropItem {
                crop_name: s.crop_name.clone(),
                crop_variety: s.crop_variety.clone(),
                crop_type: s.crop_type.clone(),
                target_rack_id: shelf.rack_id,
                target_shelf_id: shelf.shelf_id,
            })
        })
        .collect();

    Ok(PlantCropsRequest { farm_id, crops })
}

/// A crop cycle that started immediately on its target shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmediateCycle {
    pub cycle_id: i64,
    pub crop_name: String,
    #[serde(default)]
    pub crop_variety: String,
    pub rack_id: i64,
    pub shelf_id: i64,
    #[serde(default)]
    pub status: String,
}

/// A crop cycle waiting for its shelf to free up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedCycle {
    pub cycle_id: i64,
    pub crop_name: String,
    #[serde(default)]
    pub crop_variety: String,
    pub rack_id: Option<i64>,
    pub shelf_id: Option<i64>,
    #[serde(default)]
    pub status: String,
    pub waiting_for_cycle: Option<i64>,
    pub waiting_for_crop: Option<String>,
}

/// Backend classification of a submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlantingOutcome {
    #[serde(default)]
    pub immediate: Vec<ImmediateCycle>,
    #[serde(default)]
    pub queued: Vec<QueuedCycle>,
    #[serde(default)]
    pub total: Option<u32>,
}

impl PlantingOutcome {
    pub fn has_queued(&self) -> bool {
        !self.queued.is_empty()
    }

    pub fn queued_cycle_ids(&self) -> Vec<i64> {
        self.queued.iter().map(|c| c.cycle_id).collect()
    }
}
