//! Trial command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::parse_trial_params;
use crate::config::{load_base_config, load_settings, SettingsOverrides};
use crate::trial::{CommandTrainer, TrialContext, TrialRunner};

#[derive(Args)]
pub struct TrialArgs {
    /// Base training configuration (YAML, JSON or TOML)
    #[arg(short, long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Runner settings file (TOML or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory for merged trial configs (overrides settings)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Suggested parameters: a JSON object or --key=value pairs
    #[arg(value_name = "PARAMS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub params: Vec<String>,
}

pub fn run(args: TrialArgs) -> Result<()> {
    let overrides =
        SettingsOverrides { work_dir: args.work_dir.clone(), ..SettingsOverrides::default() };
    let settings = load_settings(args.settings.as_deref(), &overrides)?;
    let base = load_base_config(args.base.as_deref())?;

    let context = TrialContext::from_env(parse_trial_params(&args.params)?);
    let trainer = CommandTrainer::from_settings(&settings.trainer, &settings.work_dir);
    let runner = TrialRunner::new(base, trainer).with_marker(settings.marker.clone());

    let report = runner.run(&context)?;
    if !report.success {
        let code = report.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
        anyhow::bail!(
            "Training command '{}' failed for trial {} (exit: {})",
            settings.trainer.program,
            report.run_id.as_deref().unwrap_or(&report.digest),
            code
        );
    }
    Ok(())
}
