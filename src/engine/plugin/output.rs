use crate::engine::exec::ExecSession;
use crate::engine::page::PageOutput;
use crate::engine::types::Schema;
use crate::shared::config::{ConfigDiff, ConfigSource, TaskReport, TaskSource};

use super::PluginError;

/// Per-partition writer. Receives pages, then exactly one of `commit` or
/// `abort`, then `close`.
pub trait TransactionalPageOutput: PageOutput {
    fn abort(&mut self);

    fn commit(&mut self) -> Result<TaskReport, PluginError>;
}

/// Destination side of a pipeline.
pub trait OutputPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Finalizes the output task once the input schema and partition count are known.
    fn transaction(
        &self,
        config: &ConfigSource,
        schema: &Schema,
        task_count: usize,
    ) -> Result<TaskSource, PluginError>;

    fn resume(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
    ) -> Result<(), PluginError> {
        Err(PluginError::ResumeUnsupported(self.name().to_string()))
    }

    /// Opens the writer of partition `task_index`.
    fn open(
        &self,
        session: &ExecSession,
        task: &TaskSource,
        schema: &Schema,
        task_index: usize,
    ) -> Result<Box<dyn TransactionalPageOutput>, PluginError>;

    fn commit(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        _reports: &[TaskReport],
    ) -> Result<ConfigDiff, PluginError> {
        Ok(ConfigDiff::new())
    }

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
