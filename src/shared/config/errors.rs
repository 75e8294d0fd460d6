use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required key '{0}'")]
    MissingKey(String),

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("'{0}' is not a nested document")]
    NotAnObject(String),

    #[error("{0}")]
    Message(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
