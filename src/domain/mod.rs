//! Core data types shared by the merge, trial and CLI layers

pub mod configuration;
pub mod overrides;
pub mod path;

pub use configuration::{value_kind, Configuration};
pub use overrides::{parse_value, OverrideError, OverrideSet};
pub use path::{DottedPath, PathError};
