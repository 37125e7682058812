//! External experiment tracker
//!
//! Search, scheduling and early stopping all happen on the tracker's side. This
//! module only registers a sweep and starts the agent that calls back into
//! `sweep-runner trial` once per suggested configuration.

use std::io;

use crate::sweep::{SweepDefinition, SweepError, SweepId, SweepTarget};

pub mod wandb;

pub use wandb::WandbCli;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker command '{program}' could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    Failed { command: String, status: String, stderr: String },

    #[error("could not find a sweep id in the tracker output")]
    MissingSweepId,

    #[error("failed staging sweep definition: {0}")]
    Stage(#[source] io::Error),

    #[error(transparent)]
    Sweep(#[from] SweepError),
}

pub trait TrackingService {
    /// Register a sweep and return the id the tracker assigned.
    fn create_sweep(
        &self,
        definition: &SweepDefinition,
        target: &SweepTarget,
    ) -> Result<SweepId, TrackerError>;

    /// Run an agent until the tracker stops handing out trials, or `count` trials ran.
    fn run_agent(&self, sweep: &SweepId, count: Option<u32>) -> Result<(), TrackerError>;
}
