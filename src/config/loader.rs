//! Base training configuration loading

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::domain::{value_kind, Configuration};

/// Load the base configuration every trial starts from.
///
/// No path means an empty base. The format follows the file extension.
pub fn load_base_config(path: Option<&Path>) -> Result<Configuration> {
    let Some(path) = path else {
        tracing::debug!("no base configuration given; trials start from an empty mapping");
        return Ok(Configuration::new());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading base config: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let value: Value = match ext.as_str() {
        "yaml" | "yml" if is_blank_yaml(&content) => Value::Null,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML base config: {}", path.display()))?,
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON base config: {}", path.display()))?,
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML base config: {}", path.display()))?,
        other => anyhow::bail!(
            "Unsupported base config extension '.{}' for file {}",
            other,
            path.display()
        ),
    };

    let found = value_kind(&value);
    let config = Configuration::from_value(value).with_context(|| {
        format!("Base config must be a mapping, found a {}: {}", found, path.display())
    })?;
    tracing::debug!(path = %path.display(), keys = config.len(), "loaded base configuration");
    Ok(config)
}

/// Only whitespace and comments.
fn is_blank_yaml(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| line.is_empty() || line.starts_with('#'))
}
