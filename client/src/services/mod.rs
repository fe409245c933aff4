//! Workflow controllers for the planting screens

pub mod availability;
mod in_flight;
pub mod planting;
pub mod queue;
pub mod reallocation;

pub use availability::ShelfAvailabilityService;
pub use planting::{PlantingWorkflow, WorkflowSnapshot};
pub use queue::{QueuePanel, QueueService};
pub use reallocation::{ReallocationPanel, SaveOutcome};
