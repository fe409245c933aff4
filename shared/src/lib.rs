//! Shared types and planting rules for the INNOFarms planting workflow
//!
//! This crate contains the pure domain logic shared between the REST client,
//! the browser front end (via WASM) and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
