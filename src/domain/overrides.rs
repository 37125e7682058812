//! Per-trial parameter overrides keyed by dotted path

use serde_json::Value;

use super::configuration::value_kind;

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("invalid parameter JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("parameter JSON must be an object, found a {found}")]
    NotAnObject { found: &'static str },

    #[error("override '{token}' is missing '=value'")]
    MissingValue { token: String },

    #[error("override '{token}' has an empty key")]
    EmptyKey { token: String },
}

/// Ordered overrides. Applied front to back, so a repeated key resolves to its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSet {
    entries: Vec<(String, Value)>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    pub fn extend(&mut self, other: OverrideSet) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parse a JSON object such as the agent's `${args_json}` argument.
    pub fn from_json_object(text: &str) -> Result<Self, OverrideError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(OverrideError::NotAnObject { found: value_kind(&other) }),
        }
    }

    /// Parse `--key=value` or `key=value` tokens, typing each value with [`parse_value`].
    pub fn parse_pairs<I, S>(tokens: I) -> Result<Self, OverrideError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for token in tokens {
            let token = token.as_ref();
            let stripped = token.trim_start_matches('-');
            let Some((key, raw)) = stripped.split_once('=') else {
                return Err(OverrideError::MissingValue { token: token.to_string() });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(OverrideError::EmptyKey { token: token.to_string() });
            }
            set.push(key, parse_value(raw));
        }
        Ok(set)
    }
}

impl FromIterator<(String, Value)> for OverrideSet {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Type a command-line value.
///
/// Accepts both JSON spellings and the capitalised `True`/`False`/`None` the
/// tracker emits. Non-finite floats and anything unparseable stay strings.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        "null" | "None" => return Value::Null,
        _ => {}
    }

    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    if raw.trim_start().starts_with(['[', '{', '"']) {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
    }

    Value::String(raw.to_string())
}
