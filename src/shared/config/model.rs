use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// Capacity in bytes of every pooled page buffer.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Number of released buffers kept for reuse.
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
    /// Upper bound on bytes checked out of the allocator at once. Unbounded when absent.
    #[serde(default)]
    pub max_allocated_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Pages in flight between the input and output side of one partition.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_stdout_level")]
    pub stdout_level: String,
    #[serde(default = "default_file_level")]
    pub file_level: String,
}

fn default_page_size() -> usize {
    32 * 1024
}

fn default_pool_capacity() -> usize {
    64
}

fn default_channel_capacity() -> usize {
    4
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_stdout_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            pool_capacity: default_pool_capacity(),
            max_allocated_bytes: None,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            stdout_level: default_stdout_level(),
            file_level: default_file_level(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            executor: ExecutorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("BULK_FLOW_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path).required(false))
        .add_source(config::Environment::with_prefix("BULK_FLOW").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
