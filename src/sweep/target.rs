//! Where a sweep lives on the tracker

use std::fmt;

/// Project and optional entity (user or team) a sweep is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTarget {
    pub project: String,
    pub entity: Option<String>,
}

impl SweepTarget {
    pub fn new(project: impl Into<String>, entity: Option<String>) -> Self {
        Self { project: project.into(), entity }
    }
}

/// Sweep identifier assigned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepId {
    pub id: String,
    pub project: String,
    pub entity: Option<String>,
}

impl SweepId {
    /// Build from either a bare id or a full `entity/project/id` path.
    ///
    /// Parts missing from a shorter path are taken from `target`.
    pub fn from_path(path: &str, target: &SweepTarget) -> Option<Self> {
        let parts: Vec<&str> = path.trim().split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [id] => Some(Self {
                id: id.to_string(),
                project: target.project.clone(),
                entity: target.entity.clone(),
            }),
            [project, id] => Some(Self {
                id: id.to_string(),
                project: project.to_string(),
                entity: target.entity.clone(),
            }),
            [entity, project, id] => Some(Self {
                id: id.to_string(),
                project: project.to_string(),
                entity: Some(entity.to_string()),
            }),
            _ => None,
        }
    }

    /// Path accepted by `wandb agent`.
    pub fn agent_path(&self) -> String {
        match &self.entity {
            Some(entity) => format!("{}/{}/{}", entity, self.project, self.id),
            None => format!("{}/{}", self.project, self.id),
        }
    }
}

impl fmt::Display for SweepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.agent_path())
    }
}
