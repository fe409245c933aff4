//! Per-crop shelf selection state machine
//!
//! The operator walks a batch of crops and assigns each one to a shelf. A
//! cursor tracks the crop being assigned; picking a shelf records it and
//! advances the cursor, and the step indicators allow jumping to any crop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ShelfRef;

/// A crop in the incoming batch, before any shelf is chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBatchItem {
    pub crop_name: String,
    #[serde(default)]
    pub crop_variety: String,
    #[serde(default)]
    pub crop_type: String,
}

/// One crop of the batch and the shelf chosen for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSelection {
    /// Position in the batch, stable for the life of the selection
    pub crop_index: usize,
    pub crop_name: String,
    pub crop_variety: String,
    pub crop_type: String,
    pub selected_shelf: Option<ShelfRef>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No crops to assign")]
    EmptyBatch,

    #[error("Crop step {index} is out of range (batch has {len} crops)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Cursor over a batch of crop selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfSelection {
    selections: Vec<CropSelection>,
    cursor: usize,
}

impl ShelfSelection {
    /// Start a fresh selection for a batch: cursor on the first crop,
    /// no shelves chosen.
    pub fn new(batch: &[CropBatchItem]) -> Self {
        let selections = batch
            .iter()
            .enumerate()
            .map(|(crop_index, item)| CropSelection {
                crop_index,
                crop_name: item.crop_name.clone(),
                crop_variety: item.crop_variety.clone(),
                crop_type: item.crop_type.clone(),
                selected_shelf: None,
            })
            .collect();

        Self {
            selections,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&CropSelection> {
        self.selections.get(self.cursor)
    }

    pub fn selections(&self) -> &[CropSelection] {
        &self.selections
    }

    /// Record a shelf for the crop under the cursor, then advance.
    ///
    /// On the last crop the cursor stays put. Returns the new cursor.
    pub fn select_shelf(&mut self, shelf: ShelfRef) -> Result<usize, SelectionError> {
        let current = self
            .selections
            .get_mut(self.cursor)
            .ok_or(SelectionError::EmptyBatch)?;
        current.selected_shelf = Some(shelf);
        Ok(self.advance_from_current())
    }

    /// Move the cursor one step forward, saturating at the last crop
    pub fn advance_from_current(&mut self) -> usize {
        if self.cursor + 1 < self.selections.len() {
            self.cursor += 1;
        }
        self.cursor
    }

    /// Move the cursor to any crop, complete or not
    pub fn jump_to(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.selections.len() {
            return Err(SelectionError::IndexOutOfRange {
                index,
                len: self.selections.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    pub fn completed_count(&self) -> usize {
        self.selections
            .iter()
            .filter(|s| s.selected_shelf.is_some())
            .count()
    }

    /// True once every crop has a shelf. An empty batch is never complete.
    pub fn all_selected(&self) -> bool {
        !self.selections.is_empty() && self.completed_count() == self.selections.len()
    }

    /// Shelves chosen for more than one crop, with the crop indexes involved.
    ///
    /// Assigning the same shelf twice is allowed; this is advisory only.
    pub fn duplicate_assignments(&self) -> Vec<(ShelfRef, Vec<usize>)> {
        let mut by_shelf: BTreeMap<ShelfRef, Vec<usize>> = BTreeMap::new();
        for selection in &self.selections {
            if let Some(shelf) = selection.selected_shelf {
                by_shelf.entry(shelf).or_default().push(selection.crop_index);
            }
        }
        by_shelf
            .into_iter()
            .filter(|(_, crops)| crops.len() > 1)
            .collect()
    }
}
