//! Domain models for the INNOFarms planting workflow

mod allocation;
mod device;
mod planting;
mod queue;
mod schedule;
mod selection;
mod shelf;

pub use allocation::*;
pub use device::*;
pub use planting::*;
pub use queue::*;
pub use schedule::*;
pub use selection::*;
pub use shelf::*;
