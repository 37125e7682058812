//! Merge command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_base_config, load_settings, SettingsOverrides};
use crate::domain::OverrideSet;
use crate::merge::apply_overrides_with;

#[derive(Args)]
pub struct MergeArgs {
    /// Base training configuration (YAML, JSON or TOML)
    #[arg(short, long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Runner settings file (TOML or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Override a value by dotted path (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Print JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let settings = load_settings(args.settings.as_deref(), &SettingsOverrides::default())?;
    let base = load_base_config(args.base.as_deref())?;
    let overrides = OverrideSet::parse_pairs(&args.set)?;

    let merged = apply_overrides_with(base, &overrides, &settings.marker)?;

    if args.json {
        let text = serde_json::to_string_pretty(&merged).context("Failed encoding JSON")?;
        println!("{}", text);
    } else {
        let text = serde_yaml::to_string(&merged).context("Failed encoding YAML")?;
        print!("{}", text);
    }
    Ok(())
}
