use std::fmt;

use serde_json::{Number, Value as JsonValue};

use super::{Timestamp, TypeError, TypeTag};

/// One decoded cell. `Null` is distinct from an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Timestamp(Timestamp),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(TypeTag::Boolean),
            Value::Int64(_) => Some(TypeTag::Int64),
            Value::Float64(_) => Some(TypeTag::Float64),
            Value::String(_) => Some(TypeTag::String),
            Value::Timestamp(_) => Some(TypeTag::Timestamp),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.type_tag().map_or("null", TypeTag::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts a config literal into a value of the given column type.
    /// Timestamps accept epoch seconds or an RFC 3339 string.
    pub fn from_json(tag: TypeTag, json: &JsonValue) -> Result<Self, TypeError> {
        if json.is_null() {
            return Ok(Value::Null);
        }
        let invalid = || TypeError::InvalidLiteral {
            expected: tag,
            literal: json.to_string(),
        };
        let value = match tag {
            TypeTag::Boolean => Value::Boolean(json.as_bool().ok_or_else(invalid)?),
            TypeTag::Int64 => Value::Int64(json.as_i64().ok_or_else(invalid)?),
            TypeTag::Float64 => Value::Float64(json.as_f64().ok_or_else(invalid)?),
            TypeTag::String => Value::String(json.as_str().ok_or_else(invalid)?.to_string()),
            TypeTag::Timestamp => match json {
                JsonValue::Number(n) => match n.as_i64() {
                    Some(seconds) => Value::Timestamp(Timestamp::from_epoch_second(seconds)),
                    None => {
                        let secs = n.as_f64().ok_or_else(invalid)?;
                        let millis = (secs * 1_000.0).round() as i64;
                        Value::Timestamp(Timestamp::from_epoch_millis(millis))
                    }
                },
                JsonValue::String(raw) => {
                    Value::Timestamp(Timestamp::parse_rfc3339(raw).ok_or_else(invalid)?)
                }
                _ => return Err(invalid()),
            },
        };
        Ok(value)
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Boolean(v) => JsonValue::Bool(*v),
            Value::Int64(v) => JsonValue::Number(Number::from(*v)),
            Value::Float64(v) => Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(v) => JsonValue::String(v.clone()),
            Value::Timestamp(v) => JsonValue::String(v.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
