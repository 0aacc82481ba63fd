//! Configuration state for block instances
//!
//! A `BlockState` is the key-value bag a kind keeps its configuration in. The
//! bag is opaque to everything but the owning kind. Kinds read untrusted
//! payloads through a `ConfigReader`, which substitutes defaults for missing or
//! wrongly typed values and records a warning each time it has to.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Block configuration bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockState {
    data: Map<String, Value>,
}

impl BlockState {
    /// Create a new empty block state
    pub fn new() -> Self {
        Self { data: Map::new() }
    }

    /// Build a state from a JSON value. Anything but an object yields an empty state.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self { data: map.clone() },
            _ => Self::new(),
        }
    }

    /// The state as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Get a value from the state
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        match self.data.get(key) {
            Some(value) => {
                let result = serde_json::from_value(value.clone())?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }
}

/// Result of applying a raw payload to a kind
#[derive(Debug, Clone)]
pub struct ConfigOutcome {
    /// Canonical configuration for the kind
    pub state: BlockState,
    /// Substitutions made while normalizing the payload
    pub warnings: Vec<String>,
}

/// Lenient reader over an untrusted configuration payload
///
/// `null` and absent keys fall back to the default silently; a value of the
/// wrong type falls back too, but leaves a warning behind.
pub struct ConfigReader<'a> {
    source: Option<&'a Map<String, Value>>,
    warnings: Vec<String>,
}

impl<'a> ConfigReader<'a> {
    pub fn new(raw: &'a Value) -> Self {
        let mut warnings = Vec::new();
        let source = match raw {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                warnings.push(format!(
                    "configuration should be an object, found {}; using defaults",
                    type_name(other)
                ));
                None
            }
        };
        Self { source, warnings }
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        self.source
            .and_then(|map| map.get(key))
            .filter(|value| !value.is_null())
    }

    /// Read a string field
    pub fn string(&mut self, key: &str, default: &str) -> String {
        match self.lookup(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                self.warnings.push(format!(
                    "field `{}` should be a string, found {}; using default",
                    key,
                    type_name(other)
                ));
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    /// Read a string that must be one of `allowed`
    pub fn choice(&mut self, key: &str, allowed: &[&str], default: &str) -> String {
        let value = self.string(key, default);
        if allowed.contains(&value.as_str()) {
            value
        } else {
            self.warnings.push(format!(
                "field `{}` has unsupported value `{}`; using `{}`",
                key, value, default
            ));
            default.to_string()
        }
    }

    /// Read a list of strings, dropping non-string entries and duplicates
    pub fn string_set(&mut self, key: &str) -> Vec<String> {
        match self.lookup(key) {
            Some(Value::Array(items)) => {
                let mut out: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) if !out.contains(s) => out.push(s.clone()),
                        Value::String(_) => {}
                        other => self.warnings.push(format!(
                            "field `{}` contains a {} entry; dropped",
                            key,
                            type_name(other)
                        )),
                    }
                }
                out
            }
            Some(other) => {
                self.warnings.push(format!(
                    "field `{}` should be a list, found {}; using empty list",
                    key,
                    type_name(other)
                ));
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Warnings recorded so far
    pub fn finish(self) -> Vec<String> {
        self.warnings
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_get() {
        let state = BlockState::from_value(&json!({"text": "hello", "count": 3}));

        assert_eq!(state.get::<String>("text").unwrap(), Some("hello".to_string()));
        assert_eq!(state.get::<i64>("count").unwrap(), Some(3));
        assert_eq!(state.get::<String>("absent").unwrap(), None);
        assert!(state.get::<i64>("text").is_err());
    }

    #[test]
    fn test_state_from_non_object_is_empty() {
        assert_eq!(BlockState::from_value(&json!([1, 2])), BlockState::new());
        assert_eq!(BlockState::from_value(&json!({"a": 1})).to_value(), json!({"a": 1}));
    }

    #[test]
    fn test_reader_defaults_and_warnings() {
        let raw = json!({"text": 42, "mode": "Full Path", "inject": ["a", 7, "a", "b"]});
        let mut reader = ConfigReader::new(&raw);

        assert_eq!(reader.string("text", ""), "");
        assert_eq!(reader.string("missing", "dflt"), "dflt");
        assert_eq!(
            reader.choice("mode", &["Relative Path", "Full Path"], "Relative Path"),
            "Full Path"
        );
        assert_eq!(reader.string_set("inject"), vec!["a", "b"]);

        let warnings = reader.finish();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("`text`"));
    }

    #[test]
    fn test_reader_rejects_unknown_choice() {
        let raw = json!({"mode": "Sideways"});
        let mut reader = ConfigReader::new(&raw);
        assert_eq!(reader.choice("mode", &["A", "B"], "A"), "A");
        assert_eq!(reader.finish().len(), 1);
    }

    #[test]
    fn test_reader_non_object_payload() {
        let raw = json!("just a string");
        let mut reader = ConfigReader::new(&raw);
        assert_eq!(reader.string("text", "x"), "x");
        assert_eq!(reader.finish().len(), 1);

        let null = Value::Null;
        assert!(ConfigReader::new(&null).finish().is_empty());
    }
}
