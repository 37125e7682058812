//! Sweep definition loading
//!
//! The document belongs to the tracker's sweep API, so it is kept verbatim. Only
//! the fields this tool reads or writes are checked.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("failed reading sweep definition {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sweep YAML in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("sweep definition must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    #[error("sweep field '{field}' must be {expected}")]
    InvalidField { field: &'static str, expected: &'static str },

    #[error("failed serializing sweep definition: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepDefinition {
    document: Mapping,
}

pub fn load_sweep_definition(path: &Path) -> Result<SweepDefinition, SweepError> {
    let content = fs::read_to_string(path)
        .map_err(|source| SweepError::Read { path: path.to_path_buf(), source })?;
    SweepDefinition::parse(&content, &path.display().to_string())
}

impl SweepDefinition {
    pub fn from_yaml_str(content: &str) -> Result<Self, SweepError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, SweepError> {
        let raw: Value = serde_yaml::from_str(content)
            .map_err(|source| SweepError::Parse { origin: origin.to_string(), source })?;
        let Value::Mapping(document) = raw else {
            return Err(SweepError::NotAMapping { found: yaml_kind(&raw) });
        };
        let definition = Self { document };
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> Result<(), SweepError> {
        if let Some(parameters) = self.field("parameters") {
            if !parameters.is_mapping() {
                return Err(SweepError::InvalidField {
                    field: "parameters",
                    expected: "a mapping of parameter names",
                });
            }
        }
        if let Some(method) = self.field("method") {
            if !method.is_string() {
                return Err(SweepError::InvalidField { field: "method", expected: "a string" });
            }
        }
        if self.field("command").is_some() && self.command().is_none() {
            return Err(SweepError::InvalidField {
                field: "command",
                expected: "a list of strings",
            });
        }
        Ok(())
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.document.get(name)
    }

    fn string_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Search strategy, e.g. `grid`, `random` or `bayes`.
    pub fn method(&self) -> Option<&str> {
        self.string_field("method")
    }

    pub fn name(&self) -> Option<&str> {
        self.string_field("name")
    }

    pub fn program(&self) -> Option<&str> {
        self.string_field("program")
    }

    pub fn metric_name(&self) -> Option<&str> {
        self.field("metric").and_then(|m| m.get("name")).and_then(Value::as_str)
    }

    pub fn metric_goal(&self) -> Option<&str> {
        self.field("metric").and_then(|m| m.get("goal")).and_then(Value::as_str)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.field("parameters")
            .and_then(Value::as_mapping)
            .map(|params| params.keys().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn command(&self) -> Option<Vec<String>> {
        self.field("command")?
            .as_sequence()?
            .iter()
            .map(|part| part.as_str().map(str::to_string))
            .collect()
    }

    /// Set `command` unless the definition already carries one. Returns whether it was set.
    pub fn ensure_command(&mut self, command: Vec<String>) -> bool {
        if self.field("command").is_some() {
            return false;
        }
        let parts = command.into_iter().map(Value::String).collect();
        self.document.insert(Value::from("command"), Value::Sequence(parts));
        true
    }

    pub fn to_yaml(&self) -> Result<String, SweepError> {
        serde_yaml::to_string(&self.document).map_err(SweepError::Serialize)
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
