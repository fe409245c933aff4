//! Common types used across the platform

use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::ValidationError;

/// Farm identifier, always a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct FarmId(i64);

impl FarmId {
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(ValidationError::InvalidFarmId(id))
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for FarmId {
    type Error = ValidationError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<FarmId> for i64 {
    fn from(id: FarmId) -> Self {
        id.0
    }
}

impl std::fmt::Display for FarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical shelf location within a farm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShelfRef {
    pub rack_id: i64,
    pub shelf_id: i64,
}

impl ShelfRef {
    pub fn new(rack_id: i64, shelf_id: i64) -> Self {
        Self { rack_id, shelf_id }
    }
}

impl std::fmt::Display for ShelfRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rack {}, Shelf {}", self.rack_id, self.shelf_id)
    }
}

/// Occupancy status reported by the backend for a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShelfStatus {
    Available,
    Active,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Crop cycle lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    Pending,
    Initialized,
    Seeding,
    Transplant,
    Growing,
    Harvesting,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CycleStatus {
    /// Statuses whose shelf allocation may still be changed
    pub fn is_reallocatable(&self) -> bool {
        matches!(
            self,
            CycleStatus::Seeding | CycleStatus::Initialized | CycleStatus::Transplant
        )
    }
}

/// Filter applied to the shelf list shown during selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Available,
    Occupied,
}

/// Device power status, normalized from the backend's mixed encodings
///
/// The backend reports `"on"`/`"off"`, `1`/`0`, booleans or `"NA"`
/// depending on the endpoint. Anything unrecognised is `NotApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    On,
    Off,
    #[default]
    NotApplicable,
}

impl DeviceStatus {
    pub fn from_value(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Bool(true) => DeviceStatus::On,
            Value::Bool(false) => DeviceStatus::Off,
            Value::Number(n) => match n.as_f64() {
                Some(v) if v == 1.0 => DeviceStatus::On,
                Some(v) if v == 0.0 => DeviceStatus::Off,
                _ => DeviceStatus::NotApplicable,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "on" | "1" | "true" => DeviceStatus::On,
                "off" | "0" | "false" => DeviceStatus::Off,
                _ => DeviceStatus::NotApplicable,
            },
            _ => DeviceStatus::NotApplicable,
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, DeviceStatus::On)
    }

    pub fn toggled(&self) -> Option<Self> {
        match self {
            DeviceStatus::On => Some(DeviceStatus::Off),
            DeviceStatus::Off => Some(DeviceStatus::On),
            DeviceStatus::NotApplicable => None,
        }
    }
}

impl<'de> Deserialize<'de> for DeviceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(DeviceStatus::from_value(&value))
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceStatus::On => write!(f, "ON"),
            DeviceStatus::Off => write!(f, "OFF"),
            DeviceStatus::NotApplicable => write!(f, "N/A"),
        }
    }
}
