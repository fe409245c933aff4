//! Shelf reallocation models and the per-crop-type constraint check

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CycleStatus, FarmId};
use crate::validation::{clamp_allocation, parse_allocation_input, ValidationError};

/// An in-progress crop cycle whose shelf count can be edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub cycle_id: i64,
    pub crop_name: String,
    #[serde(default)]
    pub crop_variety: String,
    pub crop_type: String,
    #[serde(default)]
    pub status: CycleStatus,
    #[serde(rename = "allocatedShelves", deserialize_with = "deserialize_shelf_count")]
    pub allocated_shelves: u32,
    /// Baseline the edit is diffed against
    #[serde(rename = "_original", deserialize_with = "deserialize_shelf_count")]
    pub original: u32,
}

/// Shelf counts from the wire get the same minimum as edited ones
fn deserialize_shelf_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_allocation)
}

impl AllocationRow {
    pub fn new(
        cycle_id: i64,
        crop_name: impl Into<String>,
        crop_variety: impl Into<String>,
        crop_type: impl Into<String>,
        status: CycleStatus,
        allocated_shelves: u32,
    ) -> Self {
        let allocated = clamp_allocation(i64::from(allocated_shelves));
        Self {
            cycle_id,
            crop_name: crop_name.into(),
            crop_variety: crop_variety.into(),
            crop_type: crop_type.into(),
            status,
            allocated_shelves: allocated,
            original: allocated,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.allocated_shelves != self.original
    }
}

/// Backend-reported shelf capacity for one crop type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropTypeCapacity {
    #[serde(rename = "totalAvailableShelves", default)]
    pub total_available_shelves: u32,
    #[serde(rename = "totalShelvesBytype", default)]
    pub total_shelves_by_type: u32,
}

/// Derived allocation totals for one crop type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropTypeSummary {
    pub allocated: u32,
    pub available: u32,
    pub total_shelves_by_type: u32,
    pub can_reallocate: bool,
    pub over_allocated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationValidity {
    pub per_type: BTreeMap<String, CropTypeSummary>,
    pub is_valid: bool,
}

impl AllocationValidity {
    pub fn over_allocated_types(&self) -> Vec<String> {
        self.per_type
            .iter()
            .filter(|(_, s)| s.over_allocated)
            .map(|(crop_type, _)| crop_type.clone())
            .collect()
    }
}

/// Sum allocations per crop type and flag reallocatable types that exceed
/// their available shelves. Types without reported capacity have none.
pub fn compute_validity(
    rows: &[AllocationRow],
    capacities: &BTreeMap<String, CropTypeCapacity>,
) -> AllocationValidity {
    let mut per_type: BTreeMap<String, CropTypeSummary> = BTreeMap::new();

    for row in rows {
        let capacity = capacities.get(&row.crop_type).copied().unwrap_or_default();
        let summary = per_type
            .entry(row.crop_type.clone())
            .or_insert(CropTypeSummary {
                allocated: 0,
                available: capacity.total_available_shelves,
                total_shelves_by_type: capacity.total_shelves_by_type,
                can_reallocate: false,
                over_allocated: false,
            });
        summary.allocated = summary.allocated.saturating_add(row.allocated_shelves);
        summary.can_reallocate |= row.status.is_reallocatable();
    }

    for summary in per_type.values_mut() {
        summary.over_allocated = summary.can_reallocate && summary.allocated > summary.available;
    }

    let is_valid = per_type.values().all(|s| !s.over_allocated);
    AllocationValidity { per_type, is_valid }
}

/// One entry of the `PUT /api/cropcycle` body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedAllocation {
    pub cycle_id: i64,
    pub new_allocation: u32,
}

/// Body of `PUT /api/cropcycle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReallocationRequest {
    pub farm_id: FarmId,
    pub changed_allocation: Vec<ChangedAllocation>,
}

/// Editable allocation state for the reallocation panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReallocationDraft {
    rows: Vec<AllocationRow>,
    capacities: BTreeMap<String, CropTypeCapacity>,
}

impl ReallocationDraft {
    pub fn new(rows: Vec<AllocationRow>, capacities: BTreeMap<String, CropTypeCapacity>) -> Self {
        Self { rows, capacities }
    }

    pub fn rows(&self) -> &[AllocationRow] {
        &self.rows
    }

    /// Set a cycle's shelf count, clamped to at least one shelf
    pub fn set_shelves(&mut self, cycle_id: i64, value: i64) -> Result<u32, ValidationError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.cycle_id == cycle_id)
            .ok_or(ValidationError::UnknownCycle(cycle_id))?;
        row.allocated_shelves = clamp_allocation(value);
        Ok(row.allocated_shelves)
    }

    /// Commit the text left in a cycle's input on blur
    pub fn commit_input(&mut self, cycle_id: i64, input: &str) -> Result<u32, ValidationError> {
        self.set_shelves(cycle_id, i64::from(parse_allocation_input(input)))
    }

    pub fn validity(&self) -> AllocationValidity {
        compute_validity(&self.rows, &self.capacities)
    }

    pub fn has_changes(&self) -> bool {
        self.rows.iter().any(AllocationRow::is_changed)
    }

    /// Saving needs both a change and a valid allocation
    pub fn can_save(&self) -> bool {
        self.has_changes() && self.validity().is_valid
    }

    pub fn changed_allocations(&self) -> Vec<ChangedAllocation> {
        self.rows
            .iter()
            .filter(|r| r.is_changed())
            .map(|r| ChangedAllocation {
                cycle_id: r.cycle_id,
                new_allocation: r.allocated_shelves,
            })
            .collect()
    }

    /// Make the current allocations the new baseline
    pub fn mark_saved(&mut self) {
        for row in &mut self.rows {
            row.original = row.allocated_shelves;
        }
    }
}
