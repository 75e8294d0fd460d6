mod errors;
mod model;
mod source;

#[cfg(test)]
mod model_test;

use once_cell::sync::Lazy;
use std::sync::Arc;

pub use errors::ConfigError;
pub use model::{ExecutorConfig, LoggingConfig, PageConfig, Settings, load_settings};
pub use source::{ConfigDiff, ConfigSource, TaskReport, TaskSource};

/// Process-wide engine settings, loaded on first use.
pub static CONFIG: Lazy<Arc<Settings>> =
    Lazy::new(|| Arc::new(load_settings().expect("Failed to load configuration")));
