//! Launch command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::absolute_path;
use crate::config::{load_base_config, load_settings, SettingsOverrides};
use crate::sweep::{load_sweep_definition, SweepTarget};
use crate::tracker::{TrackingService, WandbCli};

#[derive(Args)]
pub struct LaunchArgs {
    /// Sweep definition (YAML) in the tracker's sweep format
    #[arg(value_name = "SWEEP_YAML")]
    pub sweep: PathBuf,

    /// Base training configuration (YAML, JSON or TOML) every trial starts from
    #[arg(short, long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Runner settings file (TOML or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Tracker project the sweep is created in
    #[arg(short, long, value_name = "NAME")]
    pub project: Option<String>,

    /// Tracker entity (user or team)
    #[arg(short, long, value_name = "NAME")]
    pub entity: Option<String>,

    /// Stop the agent after this many trials
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<u32>,

    /// Print the sweep definition that would be registered and exit
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: LaunchArgs) -> Result<()> {
    let settings_path = args.settings.as_deref().map(absolute_path).transpose()?;
    let overrides = SettingsOverrides {
        project: args.project.clone(),
        entity: args.entity.clone(),
        ..SettingsOverrides::default()
    };
    let settings = load_settings(settings_path.as_deref(), &overrides)?;

    let mut definition = load_sweep_definition(&args.sweep)?;

    // Catch a broken base config now rather than once per trial.
    let base_path = args.base.as_deref().map(absolute_path).transpose()?;
    let base = load_base_config(base_path.as_deref())?;
    tracing::debug!(keys = base.len(), "base configuration ok");

    let command = trial_command(base_path.as_deref(), settings_path.as_deref())?;
    if definition.ensure_command(command) {
        tracing::info!("sweep trials will run through sweep-runner trial");
    } else {
        tracing::warn!(
            "sweep definition has its own command; base config and report_to are not applied"
        );
    }

    if let Some(method) = definition.method() {
        tracing::info!(
            method,
            metric = ?definition.metric_name(),
            parameters = definition.parameter_names().len(),
            "loaded sweep definition"
        );
    }

    if args.dry_run {
        print!("{}", definition.to_yaml()?);
        return Ok(());
    }

    let target = SweepTarget::new(settings.project.clone(), settings.entity.clone());
    let tracker = WandbCli::new(settings.wandb_program.clone());
    let sweep = tracker.create_sweep(&definition, &target)?;
    println!("Created sweep: {}", sweep);

    tracker.run_agent(&sweep, args.count)?;
    println!("Sweep agent finished: {}", sweep);
    Ok(())
}

/// Command the agent runs per trial: this executable's `trial` subcommand.
fn trial_command(base: Option<&Path>, settings: Option<&Path>) -> Result<Vec<String>> {
    let exe = std::env::current_exe().context("Failed resolving the sweep-runner executable")?;

    let mut command = vec!["${env}".to_string(), exe.display().to_string(), "trial".to_string()];
    if let Some(base) = base {
        command.push("--base".to_string());
        command.push(base.display().to_string());
    }
    if let Some(settings) = settings {
        command.push("--settings".to_string());
        command.push(settings.display().to_string());
    }
    command.push("${args_json}".to_string());
    Ok(command)
}
