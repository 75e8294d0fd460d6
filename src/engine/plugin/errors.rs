use thiserror::Error;

use crate::engine::page::PageError;
use crate::engine::types::TypeError;
use crate::shared::config::ConfigError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data error: {0}")]
    Data(String),

    /// The page channel of this partition was torn down underneath the plugin.
    #[error("Page channel closed")]
    ChannelClosed,

    #[error("Plugin '{0}' does not support resuming")]
    ResumeUnsupported(String),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PluginError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        PluginError::Config(ConfigError::Message(message.into()))
    }

    pub fn data<S: Into<String>>(message: S) -> Self {
        PluginError::Data(message.into())
    }

    /// Teardown side effect of a failure elsewhere rather than a cause.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, PluginError::ChannelClosed)
    }
}
