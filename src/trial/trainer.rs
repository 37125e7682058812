//! Training entry point

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{TrialContext, RUN_ID_ENV, SWEEP_ID_ENV};
use crate::config::TrainerSettings;
use crate::domain::Configuration;
use crate::utils::config_digest;

/// Placeholder in trainer arguments replaced by the merged config file path.
pub const CONFIG_PLACEHOLDER: &str = "{config}";

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("failed writing trial config {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed serializing trial config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("training command '{program}' could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    pub config_path: Option<PathBuf>,
    pub success: bool,
    pub exit_code: Option<i32>,
}

pub trait Trainer: Send + Sync {
    /// Run one training trial on a fully merged configuration.
    fn train(&self, config: Configuration, context: &TrialContext)
        -> Result<TrainOutcome, TrainError>;
}

/// Writes the merged configuration to YAML and runs an external training command on it.
#[derive(Debug, Clone)]
pub struct CommandTrainer {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl CommandTrainer {
    pub fn new(program: impl Into<String>, args: Vec<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args, work_dir: work_dir.into() }
    }

    pub fn from_settings(settings: &TrainerSettings, work_dir: &Path) -> Self {
        Self::new(settings.program.clone(), settings.args.clone(), work_dir)
    }

    /// File a trial's config is written to: named after the run id when the
    /// tracker provided one, otherwise after the config digest.
    pub fn config_path_for(&self, config: &Configuration, context: &TrialContext) -> PathBuf {
        let stem = match &context.run_id {
            Some(run_id) => sanitize_file_stem(run_id),
            None => format!("trial-{}", config_digest(config)),
        };
        self.work_dir.join(format!("{stem}.yaml"))
    }

    fn write_config(&self, config: &Configuration, path: &Path) -> Result<(), TrainError> {
        fs::create_dir_all(&self.work_dir)
            .map_err(|source| TrainError::Write { path: self.work_dir.clone(), source })?;
        let yaml = serde_yaml::to_string(config)?;
        fs::write(path, yaml).map_err(|source| TrainError::Write { path: path.to_path_buf(), source })
    }

    fn render_args(&self, config_path: &Path) -> Vec<String> {
        let path = config_path.display().to_string();
        let mut rendered: Vec<String> =
            self.args.iter().map(|arg| arg.replace(CONFIG_PLACEHOLDER, &path)).collect();
        if !self.args.iter().any(|arg| arg.contains(CONFIG_PLACEHOLDER)) {
            rendered.push(path);
        }
        rendered
    }
}

impl Trainer for CommandTrainer {
    fn train(
        &self,
        config: Configuration,
        context: &TrialContext,
    ) -> Result<TrainOutcome, TrainError> {
        let config_path = self.config_path_for(&config, context);
        self.write_config(&config, &config_path)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(&config_path));
        if let Some(run_id) = &context.run_id {
            cmd.env(RUN_ID_ENV, run_id);
        }
        if let Some(sweep_id) = &context.sweep_id {
            cmd.env(SWEEP_ID_ENV, sweep_id);
        }

        tracing::info!(config = %config_path.display(), program = %self.program, "launching trainer");
        let status = cmd
            .status()
            .map_err(|source| TrainError::Spawn { program: self.program.clone(), source })?;

        Ok(TrainOutcome {
            config_path: Some(config_path),
            success: status.success(),
            exit_code: status.code(),
        })
    }
}

fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
