use std::fmt;
use std::sync::Arc;

use crate::engine::plugin::{FilterPlugin, InputPlugin, OutputPlugin, PluginError};
use crate::shared::config::ConfigSource;

/// Resolved plugins of one transfer together with their configuration.
#[derive(Clone)]
pub struct Pipeline {
    input: Arc<dyn InputPlugin>,
    input_config: ConfigSource,
    filters: Vec<(Arc<dyn FilterPlugin>, ConfigSource)>,
    output: Arc<dyn OutputPlugin>,
    output_config: ConfigSource,
}

impl Pipeline {
    pub fn new(
        input: Arc<dyn InputPlugin>,
        input_config: ConfigSource,
        output: Arc<dyn OutputPlugin>,
        output_config: ConfigSource,
    ) -> Self {
        Self {
            input,
            input_config,
            filters: Vec::new(),
            output,
            output_config,
        }
    }

    /// Splits a pipeline document into its `in`, `filters` and `out` sections.
    /// `filters` must hold one plugin per entry of the `filters` list.
    pub fn from_config(
        config: &ConfigSource,
        input: Arc<dyn InputPlugin>,
        filters: Vec<Arc<dyn FilterPlugin>>,
        output: Arc<dyn OutputPlugin>,
    ) -> Result<Self, PluginError> {
        let input_config = config.nested("in")?;
        let output_config = config.nested("out")?;
        let filter_configs: Vec<ConfigSource> = config.get_or("filters", Vec::new())?;
        if filter_configs.len() != filters.len() {
            return Err(PluginError::config(format!(
                "{} filter sections configured but {} filter plugins supplied",
                filter_configs.len(),
                filters.len()
            )));
        }

        let mut pipeline = Self::new(input, input_config, output, output_config);
        pipeline.filters = filters.into_iter().zip(filter_configs).collect();
        Ok(pipeline)
    }

    pub fn with_filter(mut self, filter: Arc<dyn FilterPlugin>, config: ConfigSource) -> Self {
        self.filters.push((filter, config));
        self
    }

    pub fn input(&self) -> &Arc<dyn InputPlugin> {
        &self.input
    }

    pub fn input_config(&self) -> &ConfigSource {
        &self.input_config
    }

    pub fn filters(&self) -> &[(Arc<dyn FilterPlugin>, ConfigSource)] {
        &self.filters
    }

    pub fn filter_plugins(&self) -> Vec<Arc<dyn FilterPlugin>> {
        self.filters.iter().map(|(p, _)| Arc::clone(p)).collect()
    }

    pub fn output(&self) -> &Arc<dyn OutputPlugin> {
        &self.output
    }

    pub fn output_config(&self) -> &ConfigSource {
        &self.output_config
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|(p, _)| p.name()).collect();
        f.debug_struct("Pipeline")
            .field("input", &self.input.name())
            .field("filters", &filters)
            .field("output", &self.output.name())
            .finish()
    }
}
