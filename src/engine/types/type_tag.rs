use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::page::{PageBuilder, PageOutput, PageReader};

use super::{Column, ColumnReader, ColumnVisitor, ColumnWriter, TypeError, Value};

/// Closed set of value kinds a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    #[serde(rename = "boolean", alias = "bool")]
    Boolean,
    #[serde(rename = "long", alias = "int64")]
    Int64,
    #[serde(rename = "double", alias = "float64")]
    Float64,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "timestamp")]
    Timestamp,
}

impl TypeTag {
    pub const ALL: [TypeTag; 5] = [
        TypeTag::Boolean,
        TypeTag::Int64,
        TypeTag::Float64,
        TypeTag::String,
        TypeTag::Timestamp,
    ];

    /// Bytes one value of this type occupies inside a record.
    /// Strings store a dictionary index, not their bytes.
    pub const fn fixed_size(self) -> usize {
        match self {
            TypeTag::Boolean => 1,
            TypeTag::Int64 => 8,
            TypeTag::Float64 => 8,
            TypeTag::String => 4,
            TypeTag::Timestamp => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Int64 => "long",
            TypeTag::Float64 => "double",
            TypeTag::String => "string",
            TypeTag::Timestamp => "timestamp",
        }
    }

    pub fn accept(self, column: &Column, visitor: &mut dyn ColumnVisitor) {
        match self {
            TypeTag::Boolean => visitor.boolean_column(column),
            TypeTag::Int64 => visitor.int64_column(column),
            TypeTag::Float64 => visitor.float64_column(column),
            TypeTag::String => visitor.string_column(column),
            TypeTag::Timestamp => visitor.timestamp_column(column),
        }
    }

    /// Typed write handle on `column`. Panics unless the column is of this type.
    pub fn writer<O: PageOutput>(
        self,
        builder: &mut PageBuilder<O>,
        column: usize,
    ) -> ColumnWriter<'_, O> {
        ColumnWriter::new(builder, column, self)
    }

    /// Typed read handle on `column`. Panics unless the column is of this type.
    pub fn reader(self, reader: &PageReader, column: usize) -> ColumnReader<'_> {
        ColumnReader::new(reader, column, self)
    }

    /// Writes `value` into `column` of the builder's current record.
    pub fn write_value<O: PageOutput>(
        self,
        builder: &mut PageBuilder<O>,
        column: usize,
        value: &Value,
    ) -> Result<(), TypeError> {
        match (self, value) {
            (_, Value::Null) => builder.set_null(column),
            (TypeTag::Boolean, Value::Boolean(v)) => builder.set_boolean(column, *v),
            (TypeTag::Int64, Value::Int64(v)) => builder.set_int64(column, *v),
            (TypeTag::Float64, Value::Float64(v)) => builder.set_float64(column, *v),
            (TypeTag::String, Value::String(v)) => builder.set_string(column, v),
            (TypeTag::Timestamp, Value::Timestamp(v)) => builder.set_timestamp(column, *v),
            (expected, other) => {
                return Err(TypeError::Mismatch {
                    column,
                    expected,
                    found: other.kind(),
                });
            }
        }
        Ok(())
    }

    /// Reads `column` of the reader's current record.
    pub fn read_value(self, reader: &PageReader, column: usize) -> Value {
        if reader.is_null(column) {
            return Value::Null;
        }
        match self {
            TypeTag::Boolean => Value::Boolean(reader.get_boolean(column)),
            TypeTag::Int64 => Value::Int64(reader.get_int64(column)),
            TypeTag::Float64 => Value::Float64(reader.get_float64(column)),
            TypeTag::String => Value::String(reader.get_string(column).to_string()),
            TypeTag::Timestamp => Value::Timestamp(reader.get_timestamp(column)),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" | "bool" => Ok(TypeTag::Boolean),
            "long" | "int64" => Ok(TypeTag::Int64),
            "double" | "float64" => Ok(TypeTag::Float64),
            "string" => Ok(TypeTag::String),
            "timestamp" => Ok(TypeTag::Timestamp),
            other => Err(TypeError::UnknownType(other.to_string())),
        }
    }
}
