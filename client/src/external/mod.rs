//! External API integrations

pub mod cropcycle;

pub use cropcycle::{FarmApi, HttpFarmApi, PlantingResponse};

#[cfg(test)]
pub(crate) mod fake;
