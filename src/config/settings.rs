//! Layered runner settings

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::merge::DEFAULT_REPORT_MARKER;

/// Environment prefix; nested keys use `__`, e.g. `SWEEP_RUNNER_TRAINER__PROGRAM`.
pub const ENV_PREFIX: &str = "SWEEP_RUNNER_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    pub project: String,
    pub entity: Option<String>,
    /// Logging integration forced into `report_to`.
    pub marker: String,
    pub wandb_program: String,
    /// Where merged per-trial configs are written.
    pub work_dir: PathBuf,
    pub trainer: TrainerSettings,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            project: "llamafactory".to_string(),
            entity: None,
            marker: DEFAULT_REPORT_MARKER.to_string(),
            wandb_program: "wandb".to_string(),
            work_dir: PathBuf::from("sweep_runs"),
            trainer: TrainerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub program: String,
    /// `{config}` is replaced by the merged config path.
    pub args: Vec<String>,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self { program: "llamafactory-cli".to_string(), args: vec!["train".into(), "{config}".into()] }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

pub fn load_settings(path: Option<&Path>, overrides: &SettingsOverrides) -> Result<RunnerSettings> {
    let mut figment = Figment::from(Serialized::defaults(RunnerSettings::default()));

    if let Some(path) = path {
        if !path.is_file() {
            anyhow::bail!("Settings file not found: {}", path.display());
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        figment = match ext.as_str() {
            "toml" => figment.merge(Toml::file(path)),
            "yaml" | "yml" => figment.merge(Yaml::file(path)),
            other => anyhow::bail!(
                "Unsupported settings extension '.{}' for file {}",
                other,
                path.display()
            ),
        };
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
    figment = figment.merge(Serialized::defaults(overrides));

    let settings: RunnerSettings = figment.extract().with_context(|| match path {
        Some(p) => format!("Invalid runner settings: {}", p.display()),
        None => "Invalid runner settings".to_string(),
    })?;
    tracing::debug!(?settings, "resolved runner settings");
    Ok(settings)
}
