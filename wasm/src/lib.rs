//! WebAssembly module for the INNOFarms planting screens
//!
//! Provides client-side computation for:
//! - Shelf availability normalization
//! - Reallocation validity checks
//! - Queue wait panels
//! - Device status normalization

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use innofarms_shared::models::*;
pub use innofarms_shared::types::*;
pub use innofarms_shared::validation::*;

fn to_js_error(context: &str, message: String) -> JsValue {
    let message = format!("{}: {}", context, message);
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn normalize_shelf_availability_json(data_json: &str) -> Result<String, String> {
    let data: ShelfAvailabilityData = serde_json::from_str(data_json).map_err(|e| e.to_string())?;
    serde_json::to_string(&normalize_availability(data)).map_err(|e| e.to_string())
}

fn allocation_validity_json(rows_json: &str, capacities_json: &str) -> Result<String, String> {
    let rows: Vec<AllocationRow> = serde_json::from_str(rows_json).map_err(|e| e.to_string())?;
    let capacities: BTreeMap<String, CropTypeCapacity> =
        serde_json::from_str(capacities_json).map_err(|e| e.to_string())?;
    serde_json::to_string(&compute_validity(&rows, &capacities)).map_err(|e| e.to_string())
}

fn queued_cycle_projection_json(cycle_json: &str) -> Result<String, String> {
    let view: QueuedCycleView = serde_json::from_str(cycle_json).map_err(|e| e.to_string())?;
    serde_json::to_string(&project_queued_cycle(&view)).map_err(|e| e.to_string())
}

/// Reclassify harvest-ready shelves as available and recount the buckets
#[wasm_bindgen]
pub fn normalize_shelf_availability(data_json: &str) -> Result<String, JsValue> {
    normalize_shelf_availability_json(data_json)
        .map_err(|e| to_js_error("Invalid shelf availability JSON", e))
}

/// Per crop type allocation totals and the over-allocation gate
#[wasm_bindgen]
pub fn compute_allocation_validity(rows_json: &str, capacities_json: &str) -> Result<String, JsValue> {
    allocation_validity_json(rows_json, capacities_json)
        .map_err(|e| to_js_error("Invalid allocation JSON", e))
}

/// Wait panel and availability banner for a queued cycle
#[wasm_bindgen]
pub fn project_queued_cycle_view(cycle_json: &str) -> Result<String, JsValue> {
    queued_cycle_projection_json(cycle_json).map_err(|e| to_js_error("Invalid queued cycle JSON", e))
}

/// Normalize a raw device status value to `ON`, `OFF` or `N/A`
#[wasm_bindgen]
pub fn normalize_device_status(value_json: &str) -> String {
    serde_json::from_str::<serde_json::Value>(value_json)
        .map(|value| DeviceStatus::from_value(&value))
        .unwrap_or_default()
        .to_string()
}

/// Human-readable wait for a shelf that frees up in `days`
#[wasm_bindgen]
pub fn format_wait_estimate(days: i32) -> String {
    wait_estimate(i64::from(days))
}

/// Clamp a typed shelf count to the minimum of one
#[wasm_bindgen]
pub fn parse_shelf_count(input: &str) -> u32 {
    parse_allocation_input(input)
}
