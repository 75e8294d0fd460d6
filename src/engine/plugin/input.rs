use crate::engine::exec::ExecSession;
use crate::engine::page::PageOutput;
use crate::engine::types::Schema;
use crate::shared::config::{ConfigDiff, ConfigSource, TaskReport, TaskSource};

use super::PluginError;

/// Outcome of input negotiation: what every partition receives.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTransaction {
    pub task: TaskSource,
    pub schema: Schema,
    pub task_count: usize,
}

impl InputTransaction {
    pub fn new(task: TaskSource, schema: Schema, task_count: usize) -> Self {
        Self {
            task,
            schema,
            task_count,
        }
    }
}

/// Source side of a pipeline.
pub trait InputPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Inspects `config` and decides the task source, schema and partition count.
    fn transaction(&self, config: &ConfigSource) -> Result<InputTransaction, PluginError>;

    /// Re-enters a previously negotiated transaction.
    fn resume(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
    ) -> Result<(), PluginError> {
        Err(PluginError::ResumeUnsupported(self.name().to_string()))
    }

    /// Emits every record of partition `task_index` into `output`.
    ///
    /// `finish` and `close` on `output` are absorbed; the stream ends when
    /// `run` returns `Ok`.
    fn run(
        &self,
        session: &ExecSession,
        task: &TaskSource,
        schema: &Schema,
        task_index: usize,
        output: &mut dyn PageOutput,
    ) -> Result<TaskReport, PluginError>;

    /// Called once every partition committed. `reports` is in partition order.
    fn commit(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        _reports: &[TaskReport],
    ) -> Result<ConfigDiff, PluginError> {
        Ok(ConfigDiff::new())
    }

    /// Called after every run with the reports of the committed partitions.
    fn cleanup(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        _successful: &[TaskReport],
    ) -> Result<(), PluginError> {
        Ok(())
    }
}
