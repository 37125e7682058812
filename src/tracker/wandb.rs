//! Weights & Biases through its `wandb` command-line tool

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::process::{Command, Output};

use super::{TrackerError, TrackingService};
use crate::sweep::{SweepDefinition, SweepId, SweepTarget};

static ANSI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ansi regex"));
static AGENT_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wandb agent\s+(\S+)").expect("valid agent regex"));
static CREATED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Created sweep with ID:\s*([A-Za-z0-9_-]+)").expect("valid created regex")
});

pub struct WandbCli {
    program: String,
}

impl WandbCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn spawn_error(&self, source: std::io::Error) -> TrackerError {
        TrackerError::Spawn { program: self.program.clone(), source }
    }
}

impl TrackingService for WandbCli {
    fn create_sweep(
        &self,
        definition: &SweepDefinition,
        target: &SweepTarget,
    ) -> Result<SweepId, TrackerError> {
        let yaml = definition.to_yaml()?;
        let mut staged = tempfile::Builder::new()
            .prefix("sweep-")
            .suffix(".yaml")
            .tempfile()
            .map_err(TrackerError::Stage)?;
        staged.write_all(yaml.as_bytes()).map_err(TrackerError::Stage)?;
        staged.flush().map_err(TrackerError::Stage)?;

        let mut cmd = self.command();
        cmd.arg("sweep").arg("--project").arg(&target.project);
        if let Some(entity) = &target.entity {
            cmd.arg("--entity").arg(entity);
        }
        cmd.arg(staged.path());

        tracing::info!(project = %target.project, entity = ?target.entity, "registering sweep");
        tracing::debug!(command = ?cmd, "running tracker");
        let output = cmd.output().map_err(|e| self.spawn_error(e))?;
        let text = combined_output(&output);
        if !output.status.success() {
            return Err(TrackerError::Failed {
                command: format!("{} sweep", self.program),
                status: output.status.to_string(),
                stderr: text.trim().to_string(),
            });
        }

        let sweep = parse_sweep_id(&text, target).ok_or(TrackerError::MissingSweepId)?;
        tracing::info!(sweep = %sweep, "sweep registered");
        Ok(sweep)
    }

    fn run_agent(&self, sweep: &SweepId, count: Option<u32>) -> Result<(), TrackerError> {
        let mut cmd = self.command();
        cmd.arg("agent");
        if let Some(count) = count {
            cmd.arg("--count").arg(count.to_string());
        }
        cmd.arg(sweep.agent_path());

        tracing::info!(sweep = %sweep, count = ?count, "starting sweep agent");
        let status = cmd.status().map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(TrackerError::Failed {
                command: format!("{} agent", self.program),
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push('\n');
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Pull the sweep id out of `wandb sweep` output.
///
/// The `wandb agent <path>` hint carries the entity, so it is preferred over the
/// bare "Created sweep with ID" line.
pub fn parse_sweep_id(output: &str, target: &SweepTarget) -> Option<SweepId> {
    let clean = ANSI_RE.replace_all(output, "");

    if let Some(caps) = AGENT_PATH_RE.captures(&clean) {
        if let Some(sweep) = SweepId::from_path(&caps[1], target) {
            return Some(sweep);
        }
    }

    CREATED_RE.captures(&clean).and_then(|caps| SweepId::from_path(&caps[1], target))
}
