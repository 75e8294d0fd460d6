use thiserror::Error;

use super::TypeTag;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("Unknown column type: {0}")]
    UnknownType(String),

    #[error("Column {column} expects {expected} but got {found}")]
    Mismatch {
        column: usize,
        expected: TypeTag,
        found: &'static str,
    },

    #[error("Cannot convert {literal} to {expected}")]
    InvalidLiteral { expected: TypeTag, literal: String },

    #[error("Timestamp nanos out of range: {seconds}.{nanos}")]
    InvalidTimestamp { seconds: i64, nanos: u32 },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}
