//! Small shared helpers

pub mod hashing;

pub use hashing::config_digest;
