//! Shelf availability models and normalization

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{ShelfRef, ShelfStatus, ViewMode};

/// A rack shelf as reported by the shelf-availability endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub rack_id: i64,
    pub shelf_id: i64,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub status: ShelfStatus,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
    #[serde(rename = "queueLength", default, skip_serializing_if = "Option::is_none")]
    pub queue_length: Option<u32>,
    #[serde(rename = "currentCycle", default, skip_serializing_if = "Option::is_none")]
    pub current_cycle: Option<ShelfCycle>,
}

/// The crop cycle currently occupying a shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfCycle {
    pub cycle_id: i64,
    #[serde(default)]
    pub crop_name: String,
    #[serde(default)]
    pub crop_variety: String,
    pub current_stage: Option<String>,
    pub days_until_harvest: Option<i64>,
    pub expected_harvest_date: Option<String>,
}

impl Shelf {
    pub fn location(&self) -> ShelfRef {
        ShelfRef::new(self.rack_id, self.shelf_id)
    }

    /// Whether the shelf can take a new crop.
    ///
    /// A cycle with zero days until harvest frees its shelf regardless of
    /// what the backend reports in `status` or `isAvailable`.
    pub fn classify_available(&self) -> bool {
        self.status == ShelfStatus::Available
            || self.is_available
            || self
                .current_cycle
                .as_ref()
                .and_then(|c| c.days_until_harvest)
                == Some(0)
    }
}

/// Shelves split into available and occupied buckets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfBuckets {
    #[serde(default)]
    pub available_shelves: Vec<Shelf>,
    #[serde(default)]
    pub occupied_shelves: Vec<Shelf>,
    #[serde(default)]
    pub total_available: usize,
    #[serde(default)]
    pub total_occupied: usize,
}

/// Payload of `GET /api/cropcycle/shelf-availability`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShelfAvailabilityData {
    #[serde(default)]
    pub shelves: ShelfBuckets,
    #[serde(default)]
    pub completion_suggestions: Vec<serde_json::Value>,
    #[serde(default)]
    pub queue_recommendations: serde_json::Value,
    #[serde(default)]
    pub summary: serde_json::Value,
}

impl ShelfAvailabilityData {
    /// Shelves visible under the given view filter
    pub fn visible_shelves(&self, mode: ViewMode) -> Vec<&Shelf> {
        let available = self.shelves.available_shelves.iter();
        let occupied = self.shelves.occupied_shelves.iter();
        match mode {
            ViewMode::All => available.chain(occupied).collect(),
            ViewMode::Available => available.collect(),
            ViewMode::Occupied => occupied.collect(),
        }
    }

    pub fn find_shelf(&self, location: ShelfRef) -> Option<&Shelf> {
        self.visible_shelves(ViewMode::All)
            .into_iter()
            .find(|s| s.location() == location)
    }
}

/// Reclassify shelf availability and rebuild the buckets.
///
/// Both input lists are merged (first occurrence of a location wins), each
/// shelf is classified with [`Shelf::classify_available`], and the counts are
/// recomputed from the resulting buckets. Applying this twice gives the same
/// result as applying it once.
pub fn normalize_availability(data: ShelfAvailabilityData) -> ShelfAvailabilityData {
    let ShelfAvailabilityData {
        shelves,
        completion_suggestions,
        queue_recommendations,
        summary,
    } = data;

    let mut seen = HashSet::new();
    let mut available_shelves = Vec::new();
    let mut occupied_shelves = Vec::new();

    for mut shelf in shelves
        .available_shelves
        .into_iter()
        .chain(shelves.occupied_shelves)
    {
        if !seen.insert(shelf.location()) {
            continue;
        }

        if shelf.classify_available() {
            shelf.is_available = true;
            shelf.status = ShelfStatus::Available;
            available_shelves.push(shelf);
        } else {
            shelf.is_available = false;
            occupied_shelves.push(shelf);
        }
    }

    ShelfAvailabilityData {
        shelves: ShelfBuckets {
            total_available: available_shelves.len(),
            total_occupied: occupied_shelves.len(),
            available_shelves,
            occupied_shelves,
        },
        completion_suggestions,
        queue_recommendations,
        summary,
    }
}
