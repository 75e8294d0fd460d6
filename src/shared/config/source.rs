use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::ConfigError;

/// Nested key/value document handed to plugins.
///
/// Task sources, task reports and config diffs share this shape; the engine
/// only stores, merges and forwards them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSource {
    values: Map<String, Value>,
}

/// Immutable per-plugin configuration derived once at negotiation time.
pub type TaskSource = ConfigSource;
/// What one partition did, returned after it committed.
pub type TaskReport = ConfigSource;
/// What the caller should remember for the next incremental run.
pub type ConfigDiff = ConfigSource;

impl ConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(ConfigError::NotAnObject(other.to_string())),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Self::from_json(serde_json::from_str(raw)?)
    }

    /// Serializes a typed task struct into a document.
    pub fn from_task<T: Serialize>(task: &T) -> Result<Self, ConfigError> {
        Self::from_json(serde_json::to_value(task)?)
    }

    /// Deserializes the whole document into a typed task struct.
    pub fn load_task<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.to_json()).map_err(|e| ConfigError::InvalidValue {
            key: "<root>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Err(ConfigError::MissingKey(key.to_string())),
            Some(value) => decode(key, value),
        }
    }

    pub fn get_optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(key, value).map(Some),
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        Ok(self.get_optional(key)?.unwrap_or(default))
    }

    pub fn nested(&self, key: &str) -> Result<ConfigSource, ConfigError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Err(ConfigError::MissingKey(key.to_string())),
            Some(Value::Object(values)) => Ok(Self {
                values: values.clone(),
            }),
            Some(_) => Err(ConfigError::NotAnObject(key.to_string())),
        }
    }

    pub fn nested_or_empty(&self, key: &str) -> Result<ConfigSource, ConfigError> {
        if self.has(key) {
            self.nested(key)
        } else {
            Ok(Self::new())
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<&mut Self, ConfigError> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn set_nested(&mut self, key: &str, nested: ConfigSource) -> &mut Self {
        self.values
            .insert(key.to_string(), Value::Object(nested.values));
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deep merge: nested documents merge key by key, anything else in `other` wins.
    pub fn merge(&mut self, other: &ConfigSource) -> &mut Self {
        for (key, incoming) in &other.values {
            match (self.values.get_mut(key), incoming) {
                (Some(Value::Object(existing)), Value::Object(update)) => {
                    merge_objects(existing, update);
                }
                _ => {
                    self.values.insert(key.clone(), incoming.clone());
                }
            }
        }
        self
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, ConfigError> {
    T::deserialize(value).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn merge_objects(target: &mut Map<String, Value>, update: &Map<String, Value>) {
    for (key, incoming) in update {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_objects(existing, nested);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

impl TryFrom<Value> for ConfigSource {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}
