//! Dotted-path keys such as `training_args.learning_rate`

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("override key is empty")]
    Empty,

    #[error("override key '{key}' contains an empty segment")]
    EmptySegment { key: String },
}

/// A validated override key split into its segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedPath {
    key: String,
    segments: Vec<String>,
}

impl DottedPath {
    pub fn parse(key: &str) -> Result<Self, PathError> {
        if key.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = key.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment { key: key.to_string() });
        }
        Ok(Self { key: key.to_string(), segments })
    }

    /// Every segment except the last; these must resolve to mappings.
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_dots() {
        let path = DottedPath::parse("training_args.optim.lr").expect("valid");
        assert_eq!(path.parents(), &["training_args".to_string(), "optim".to_string()]);
        assert_eq!(path.leaf(), "lr");
        assert_eq!(path.to_string(), "training_args.optim.lr");
    }

    #[test]
    fn single_segment_has_no_parents() {
        let path = DottedPath::parse("learning_rate").expect("valid");
        assert!(path.parents().is_empty());
        assert_eq!(path.leaf(), "learning_rate");
    }

    #[test]
    fn rejects_empty_keys_and_segments() {
        assert_eq!(DottedPath::parse(""), Err(PathError::Empty));
        for key in ["a..b", ".a", "a."] {
            assert_eq!(
                DottedPath::parse(key),
                Err(PathError::EmptySegment { key: key.to_string() }),
                "{key} should be rejected"
            );
        }
    }
}
