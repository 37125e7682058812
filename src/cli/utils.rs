//! Shared CLI utilities.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::OverrideSet;

/// Parse trial parameters as handed over by the agent.
///
/// Each argument is either a JSON object (`${args_json}`) or a `--key=value`
/// token (`${args}`). Both forms may be mixed; order is kept.
pub fn parse_trial_params(params: &[String]) -> Result<OverrideSet> {
    let mut overrides = OverrideSet::new();
    for param in params {
        if param.trim_start().starts_with('{') {
            let parsed = OverrideSet::from_json_object(param)
                .with_context(|| format!("Invalid trial parameters: {}", param))?;
            overrides.extend(parsed);
        } else {
            overrides.extend(OverrideSet::parse_pairs([param])?);
        }
    }
    Ok(overrides)
}

/// Absolute form of a user-supplied path, so it survives the agent changing directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize().with_context(|| format!("Path does not exist: {}", path.display()))
}
