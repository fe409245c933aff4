//! Validation rules for the planting and reallocation workflows
//!
//! Everything here runs client side before any request is sent.

use thiserror::Error;

use crate::models::CropSelection;

/// Smallest number of shelves a crop cycle can hold
pub const MIN_ALLOCATED_SHELVES: u32 = 1;

/// Client-detected precondition failures. These never reach the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Farm ID must be a positive integer (got {0})")]
    InvalidFarmId(i64),

    #[error("Please select a shelf for all crops")]
    IncompleteSelection { missing: Vec<usize> },

    #[error("No crops selected for planting")]
    EmptyBatch,

    #[error("Shelf allocation exceeds available shelves for: {}", .crop_types.join(", "))]
    OverAllocated { crop_types: Vec<String> },

    #[error("Crop cycle {0} is not part of this allocation")]
    UnknownCycle(i64),

    #[error("Stage {0} is not part of this crop cycle schedule")]
    UnknownStage(String),

    #[error("Shifting stage {0} moves it outside the supported date range")]
    DateOutOfRange(String),
}

// ============================================================================
// Selection Validations
// ============================================================================

/// Every crop in the batch must have a shelf before planting
pub fn validate_selection_complete(selections: &[CropSelection]) -> Result<(), ValidationError> {
    if selections.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    let missing: Vec<usize> = selections
        .iter()
        .filter(|s| s.selected_shelf.is_none())
        .map(|s| s.crop_index)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::IncompleteSelection { missing })
    }
}

// ============================================================================
// Allocation Validations
// ============================================================================

/// Clamp an edited allocation to the minimum of one shelf
pub fn clamp_allocation(value: i64) -> u32 {
    if value < i64::from(MIN_ALLOCATED_SHELVES) {
        MIN_ALLOCATED_SHELVES
    } else {
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

/// Coerce free-text allocation input, as left in the field on blur
///
/// Empty or non-numeric input becomes the minimum.
pub fn parse_allocation_input(input: &str) -> u32 {
    input
        .trim()
        .parse::<i64>()
        .map(clamp_allocation)
        .unwrap_or(MIN_ALLOCATED_SHELVES)
}
