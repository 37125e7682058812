//! Dotted-path override merging
//!
//! Applies a trial's suggested parameters onto a base training configuration and
//! makes sure the tracker's logging integration is listed in `report_to`.

use serde_json::{Map, Value};

use crate::domain::{value_kind, Configuration, DottedPath, OverrideSet, PathError};

/// Logging integration that must appear in `report_to` for sweep runs.
pub const DEFAULT_REPORT_MARKER: &str = "wandb";

pub const REPORT_TO_KEY: &str = "report_to";

/// Disables every integration; replaced by the marker.
const REPORT_NONE: &str = "none";
/// Already enables every integration, the marker included.
const REPORT_ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("cannot apply override '{key}': '{segment}' is a {found}, not a mapping")]
    NotAMapping { key: String, segment: String, found: &'static str },

    #[error("'report_to' must be a list or a string, found a {found}")]
    ReportToNotList { found: &'static str },
}

/// Merge `overrides` into `base` and enable the default logging integration.
pub fn apply_overrides(
    base: Configuration,
    overrides: &OverrideSet,
) -> Result<Configuration, MergeError> {
    apply_overrides_with(base, overrides, DEFAULT_REPORT_MARKER)
}

/// Merge `overrides` into `base` in iteration order, then ensure `marker` is in `report_to`.
pub fn apply_overrides_with(
    mut base: Configuration,
    overrides: &OverrideSet,
    marker: &str,
) -> Result<Configuration, MergeError> {
    for (key, value) in overrides.iter() {
        let previous = set_path(&mut base, key, value.clone())?;
        if previous.is_some() {
            tracing::debug!(key, "override replaced existing value");
        }
    }
    ensure_report_to(&mut base, marker)?;
    Ok(base)
}

/// Set a nested value, creating missing intermediate mappings.
///
/// Returns the value previously stored at the leaf. An intermediate segment that
/// holds anything other than a mapping is an error and leaves that value intact.
pub fn set_path(
    config: &mut Configuration,
    key: &str,
    value: Value,
) -> Result<Option<Value>, MergeError> {
    let path = DottedPath::parse(key)?;

    let mut target = config.as_map_mut();
    for segment in path.parents() {
        let slot = target.entry(segment.clone()).or_insert_with(|| Value::Object(Map::new()));
        target = match slot {
            Value::Object(map) => map,
            other => {
                return Err(MergeError::NotAMapping {
                    key: key.to_string(),
                    segment: segment.clone(),
                    found: value_kind(other),
                })
            }
        };
    }

    Ok(target.insert(path.leaf().to_string(), value))
}

/// Make sure `report_to` lists `marker`.
///
/// A string is first promoted to a one-element list. Absent, `null` or a sole
/// `"none"` becomes `[marker]`; a sole `"all"` is kept as is; any other list
/// missing the marker gets it appended.
pub fn ensure_report_to(config: &mut Configuration, marker: &str) -> Result<(), MergeError> {
    let map = config.as_map_mut();

    let mut items = match map.get(REPORT_TO_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(single)) => vec![Value::String(single.clone())],
        Some(Value::Array(items)) => items.clone(),
        Some(other) => return Err(MergeError::ReportToNotList { found: value_kind(other) }),
    };

    // "none" and "all" are only valid as the sole entry.
    let sole = sole_entry(&items);
    let keep_all = sole == Some(REPORT_ALL);
    if sole == Some(REPORT_NONE) {
        items.clear();
    }

    if !keep_all && !items.iter().any(|item| item.as_str() == Some(marker)) {
        items.push(Value::from(marker));
    }
    // Existing keys keep their position on insert.
    map.insert(REPORT_TO_KEY.to_string(), Value::Array(items));
    Ok(())
}

fn sole_entry(items: &[Value]) -> Option<&str> {
    match items {
        [only] => only.as_str(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    fn config(value: Value) -> Configuration {
        Configuration::from_value(value).expect("object")
    }

    fn overrides(pairs: &[(&str, Value)]) -> OverrideSet {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn creates_missing_intermediate_mappings() {
        let merged =
            apply_overrides(Configuration::new(), &overrides(&[("a.b", json!(1))])).expect("merge");
        assert_eq!(merged.into_value(), json!({"a": {"b": 1}, "report_to": ["wandb"]}));
    }

    #[test]
    fn preserves_sibling_keys() {
        let base = config(json!({"a": {"b": 2, "c": 3}}));
        let merged = apply_overrides(base, &overrides(&[("a.b", json!(5))])).expect("merge");
        assert_eq!(merged.into_value(), json!({"a": {"b": 5, "c": 3}, "report_to": ["wandb"]}));
    }

    #[test]
    fn empty_inputs_only_add_report_to() {
        let merged = apply_overrides(Configuration::new(), &OverrideSet::new()).expect("merge");
        assert_eq!(merged.into_value(), json!({"report_to": ["wandb"]}));
    }

    #[test]
    fn appends_marker_to_existing_report_to() {
        let base = config(json!({"report_to": ["tensorboard"]}));
        let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["tensorboard", "wandb"])));
    }

    #[test]
    fn report_to_with_marker_is_unchanged() {
        let base = config(json!({"report_to": ["wandb"]}));
        let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["wandb"])));

        let again = apply_overrides(merged, &OverrideSet::new()).expect("merge twice");
        assert_eq!(again.get("report_to"), Some(&json!(["wandb"])));
    }

    #[test]
    fn string_report_to_is_promoted() {
        let base = config(json!({"report_to": "tensorboard"}));
        let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["tensorboard", "wandb"])));

        let base = config(json!({"report_to": "none"}));
        let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["wandb"])));

        let base = config(json!({"report_to": null}));
        let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["wandb"])));
    }

    #[test]
    fn exclusive_report_to_values_stay_alone() {
        for none in [json!("none"), json!(["none"])] {
            let base = config(json!({ "report_to": none }));
            let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
            assert_eq!(merged.get("report_to"), Some(&json!(["wandb"])));
        }

        for all in [json!("all"), json!(["all"])] {
            let base = config(json!({ "report_to": all }));
            let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
            assert_eq!(merged.get("report_to"), Some(&json!(["all"])));
        }

        // Only special as the sole entry.
        let base = config(json!({"report_to": ["tensorboard", "none"]}));
        let merged = apply_overrides(base, &OverrideSet::new()).expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["tensorboard", "none", "wandb"])));
    }

    #[test]
    fn non_list_report_to_is_rejected() {
        let base = config(json!({"report_to": 3}));
        let err = apply_overrides(base, &OverrideSet::new()).expect_err("should fail");
        assert_eq!(err, MergeError::ReportToNotList { found: "number" });
    }

    #[test]
    fn custom_marker_is_used() {
        let merged = apply_overrides_with(Configuration::new(), &OverrideSet::new(), "mlflow")
            .expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["mlflow"])));
    }

    #[test]
    fn overrides_may_set_report_to_itself() {
        let merged = apply_overrides(
            Configuration::new(),
            &overrides(&[("report_to", json!(["tensorboard"]))]),
        )
        .expect("merge");
        assert_eq!(merged.get("report_to"), Some(&json!(["tensorboard", "wandb"])));
    }

    #[test]
    fn last_override_wins_on_exact_collision() {
        let set = overrides(&[("a.b", json!(1)), ("a.b", json!(2))]);
        let merged = apply_overrides(Configuration::new(), &set).expect("merge");
        assert_eq!(merged.get_path("a.b"), Some(&json!(2)));
    }

    #[test]
    fn later_override_can_replace_a_created_mapping() {
        let set = overrides(&[("a.b", json!(1)), ("a", json!("flat"))]);
        let merged = apply_overrides(Configuration::new(), &set).expect("merge");
        assert_eq!(merged.get("a"), Some(&json!("flat")));
    }

    #[test]
    fn composite_values_are_stored_verbatim() {
        let set = overrides(&[("lora.target", json!({"modules": ["q_proj", "v_proj"]}))]);
        let merged = apply_overrides(Configuration::new(), &set).expect("merge");
        assert_eq!(merged.get_path("lora.target.modules"), Some(&json!(["q_proj", "v_proj"])));
    }

    #[test]
    fn non_mapping_intermediate_fails_loudly() {
        let base = config(json!({"a": 1}));
        let err = apply_overrides(base, &overrides(&[("a.b", json!(2))])).expect_err("should fail");
        assert_eq!(
            err,
            MergeError::NotAMapping {
                key: "a.b".to_string(),
                segment: "a".to_string(),
                found: "number"
            }
        );
    }

    #[test]
    fn invalid_keys_are_rejected() {
        let err = apply_overrides(Configuration::new(), &overrides(&[("a..b", json!(1))]))
            .expect_err("should fail");
        assert!(matches!(err, MergeError::InvalidPath(PathError::EmptySegment { .. })));
    }

    #[test]
    fn merging_a_copy_leaves_the_base_untouched() {
        let base = config(json!({
            "training_args": {"learning_rate": 0.001, "epochs": 3},
            "report_to": ["tensorboard"]
        }));
        let snapshot = base.clone();
        let set = overrides(&[("training_args.learning_rate", json!(0.01)), ("new.key", json!(1))]);

        let merged = apply_overrides(base.clone(), &set).expect("merge");

        assert_eq!(base, snapshot);
        assert_eq!(merged.get_path("training_args.learning_rate"), Some(&json!(0.01)));
        assert_eq!(merged.get_path("training_args.epochs"), Some(&json!(3)));
    }

    #[test]
    fn set_path_returns_previous_leaf() {
        let mut cfg = config(json!({"a": {"b": 1}}));
        let previous = set_path(&mut cfg, "a.b", json!(9)).expect("set");
        assert_eq!(previous, Some(json!(1)));
        assert_eq!(set_path(&mut cfg, "a.c", json!(0)).expect("set"), None);
    }
}
