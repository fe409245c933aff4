//! Optimistic state for device toggles

use serde::Serialize;

use crate::types::DeviceStatus;

/// Lifecycle of a locally overridden value awaiting server confirmation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum OptimisticState<T> {
    #[default]
    Idle,
    Pending(T),
    Reverting,
}

/// A device switch shown with an optimistic value while a toggle request
/// is in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceToggle {
    confirmed: DeviceStatus,
    state: OptimisticState<DeviceStatus>,
}

impl DeviceToggle {
    pub fn new(confirmed: DeviceStatus) -> Self {
        Self {
            confirmed,
            state: OptimisticState::Idle,
        }
    }

    pub fn state(&self) -> &OptimisticState<DeviceStatus> {
        &self.state
    }

    /// Value to render right now
    pub fn displayed(&self) -> DeviceStatus {
        match self.state {
            OptimisticState::Pending(value) => value,
            _ => self.confirmed,
        }
    }

    /// Start a toggle. Returns the optimistic value, or `None` when the
    /// device has no on/off state or a toggle is already underway.
    pub fn begin_toggle(&mut self) -> Option<DeviceStatus> {
        if self.state != OptimisticState::Idle {
            return None;
        }
        let target = self.confirmed.toggled()?;
        self.state = OptimisticState::Pending(target);
        Some(target)
    }

    /// The server accepted the change and reported the actual status
    pub fn confirm(&mut self, actual: DeviceStatus) {
        self.confirmed = actual;
        self.state = OptimisticState::Idle;
    }

    /// The server rejected the change; show the confirmed value again
    pub fn reject(&mut self) {
        if matches!(self.state, OptimisticState::Pending(_)) {
            self.state = OptimisticState::Reverting;
        }
    }

    pub fn finish_revert(&mut self) {
        if self.state == OptimisticState::Reverting {
            self.state = OptimisticState::Idle;
        }
    }
}
