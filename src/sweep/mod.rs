//! Sweep definitions and the identifiers the tracker hands back

pub mod definition;
pub mod target;

pub use definition::{load_sweep_definition, SweepDefinition, SweepError};
pub use target::{SweepId, SweepTarget};
