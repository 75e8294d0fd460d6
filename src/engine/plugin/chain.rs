use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::engine::exec::ExecSession;
use crate::engine::page::PageOutput;
use crate::engine::types::Schema;
use crate::shared::config::{ConfigSource, TaskSource};

use super::{FilterPlugin, PluginError};

const LOG_TARGET: &str = "engine::plugin::chain";

/// One negotiated filter with the schemas on either side of it.
#[derive(Clone)]
pub struct FilterStage {
    plugin: Arc<dyn FilterPlugin>,
    task: TaskSource,
    input_schema: Schema,
    output_schema: Schema,
}

impl FilterStage {
    pub fn plugin(&self) -> &Arc<dyn FilterPlugin> {
        &self.plugin
    }

    pub fn task(&self) -> &TaskSource {
        &self.task
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}

impl fmt::Debug for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStage")
            .field("plugin", &self.plugin.name())
            .field("input_columns", &self.input_schema.column_count())
            .field("output_columns", &self.output_schema.column_count())
            .finish()
    }
}

/// Ordered filters between the input and the output.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Runs every filter's transaction in order, threading the schema through.
    /// On failure returns the position of the filter that rejected its config.
    pub fn negotiate(
        filters: &[(Arc<dyn FilterPlugin>, ConfigSource)],
        input_schema: &Schema,
    ) -> Result<Self, (usize, PluginError)> {
        let mut stages = Vec::with_capacity(filters.len());
        let mut schema = input_schema.clone();
        for (position, (plugin, config)) in filters.iter().enumerate() {
            let transaction = plugin
                .transaction(config, &schema)
                .map_err(|err| (position, err))?;
            debug!(
                target: LOG_TARGET,
                filter = plugin.name(),
                position,
                columns = transaction.output_schema.column_count(),
                "Filter negotiated"
            );
            stages.push(FilterStage {
                plugin: Arc::clone(plugin),
                task: transaction.task,
                input_schema: schema,
                output_schema: transaction.output_schema.clone(),
            });
            schema = transaction.output_schema;
        }
        Ok(Self { stages })
    }

    /// Rebuilds a chain from tasks and output schemas negotiated earlier.
    pub fn restore(
        plugins: &[Arc<dyn FilterPlugin>],
        input_schema: &Schema,
        tasks: &[TaskSource],
        output_schemas: &[Schema],
    ) -> Result<Self, PluginError> {
        if plugins.len() != tasks.len() || plugins.len() != output_schemas.len() {
            return Err(PluginError::config(format!(
                "{} filters configured but {} tasks and {} schemas were saved",
                plugins.len(),
                tasks.len(),
                output_schemas.len()
            )));
        }
        let mut schema = input_schema.clone();
        let stages = plugins
            .iter()
            .zip(tasks)
            .zip(output_schemas)
            .map(|((plugin, task), output_schema)| FilterStage {
                plugin: Arc::clone(plugin),
                task: task.clone(),
                input_schema: std::mem::replace(&mut schema, output_schema.clone()),
                output_schema: output_schema.clone(),
            })
            .collect();
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn tasks(&self) -> Vec<TaskSource> {
        self.stages.iter().map(|s| s.task.clone()).collect()
    }

    pub fn output_schemas(&self) -> Vec<Schema> {
        self.stages.iter().map(|s| s.output_schema.clone()).collect()
    }

    /// Schema of the pages leaving the last filter.
    pub fn output_schema<'a>(&'a self, input_schema: &'a Schema) -> &'a Schema {
        self.stages
            .last()
            .map(|s| &s.output_schema)
            .unwrap_or(input_schema)
    }

    /// Wraps `output` with every filter, last filter innermost.
    pub fn open(
        &self,
        session: &ExecSession,
        output: Box<dyn PageOutput>,
    ) -> Result<Box<dyn PageOutput>, PluginError> {
        self.stages.iter().rev().try_fold(output, |sink, stage| {
            stage.plugin.open(
                session,
                &stage.task,
                &stage.input_schema,
                &stage.output_schema,
                sink,
            )
        })
    }
}
