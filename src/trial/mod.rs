//! Per-trial callback: merge suggested parameters and hand off to the trainer

use chrono::{DateTime, Utc};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{Configuration, OverrideSet};
use crate::merge::{apply_overrides_with, MergeError, DEFAULT_REPORT_MARKER};
use crate::utils::config_digest;

pub mod trainer;

pub use trainer::{CommandTrainer, TrainError, TrainOutcome, Trainer};

pub const SWEEP_ID_ENV: &str = "WANDB_SWEEP_ID";
pub const RUN_ID_ENV: &str = "WANDB_RUN_ID";

#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    #[error("failed merging trial parameters: {0}")]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Train(#[from] TrainError),
}

/// Everything one trial needs to know, passed explicitly instead of read from global tracker state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialContext {
    pub sweep_id: Option<String>,
    pub run_id: Option<String>,
    pub overrides: OverrideSet,
}

impl TrialContext {
    pub fn new(overrides: OverrideSet) -> Self {
        Self { overrides, ..Self::default() }
    }

    /// Pick up the sweep and run ids the agent exports into the trial's environment.
    pub fn from_env(overrides: OverrideSet) -> Self {
        Self { sweep_id: non_empty_env(SWEEP_ID_ENV), run_id: non_empty_env(RUN_ID_ENV), overrides }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_sweep_id(mut self, sweep_id: impl Into<String>) -> Self {
        self.sweep_id = Some(sweep_id.into());
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct TrialReport {
    pub run_id: Option<String>,
    pub digest: String,
    pub config_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl TrialReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs trials against a fixed base configuration.
///
/// The base sits behind an `Arc` and is only ever cloned, so runners shared
/// across threads never see each other's overrides.
pub struct TrialRunner<T: Trainer> {
    base: Arc<Configuration>,
    marker: String,
    trainer: T,
}

impl<T: Trainer> TrialRunner<T> {
    pub fn new(base: Configuration, trainer: T) -> Self {
        Self { base: Arc::new(base), marker: DEFAULT_REPORT_MARKER.to_string(), trainer }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn base(&self) -> &Configuration {
        &self.base
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Merged configuration for `context` without training.
    pub fn prepare(&self, context: &TrialContext) -> Result<Configuration, MergeError> {
        apply_overrides_with(self.base.as_ref().clone(), &context.overrides, &self.marker)
    }

    pub fn run(&self, context: &TrialContext) -> Result<TrialReport, TrialError> {
        let started_at = Utc::now();
        let config = self.prepare(context)?;
        let digest = config_digest(&config);

        tracing::info!(
            run_id = ?context.run_id,
            sweep_id = ?context.sweep_id,
            overrides = context.overrides.len(),
            digest = %digest,
            "starting trial"
        );
        for (key, value) in context.overrides.iter() {
            tracing::debug!(key, %value, "trial parameter");
        }

        let outcome = self.trainer.train(config, context)?;
        let finished_at = Utc::now();

        let report = TrialReport {
            run_id: context.run_id.clone(),
            digest,
            config_path: outcome.config_path,
            started_at,
            finished_at,
            success: outcome.success,
            exit_code: outcome.exit_code,
        };
        if report.success {
            tracing::info!(
                digest = %report.digest,
                seconds = report.duration().num_seconds(),
                "trial finished"
            );
        } else {
            tracing::warn!(digest = %report.digest, exit_code = ?report.exit_code, "trial failed");
        }
        Ok(report)
    }
}
