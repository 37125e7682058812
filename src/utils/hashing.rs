//! Stable digests for merged configurations

use sha2::{Digest, Sha256};

use crate::domain::Configuration;

/// First 16 hex chars of the SHA-256 of the configuration's compact JSON form.
///
/// Key order is part of the input, so two configs that differ only in ordering
/// get different digests.
pub fn config_digest(config: &Configuration) -> String {
    let encoded =
        serde_json::to_vec(config).expect("string-keyed JSON map always serializes");
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    let result = hasher.finalize();
    format!("{:x}", result)[..16].to_string()
}
