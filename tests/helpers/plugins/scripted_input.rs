use std::collections::HashMap;

use parking_lot::Mutex;

use crate::engine::exec::ExecSession;
use crate::engine::page::PageOutput;
use crate::engine::plugin::{InputPlugin, InputTransaction, PluginError};
use crate::engine::types::{Schema, Value};
use crate::shared::config::{ConfigDiff, ConfigSource, TaskReport, TaskSource};

#[derive(Debug, Clone, Copy)]
pub enum InputFailure {
    /// Raise before emitting anything.
    Immediately,
    /// Emit and flush this many rows, then raise.
    AfterRows(usize),
}

/// Input plugin replaying fixed rows per partition, with injectable failures.
pub struct ScriptedInput {
    schema: Schema,
    partitions: Vec<Vec<Vec<Value>>>,
    failures: HashMap<usize, InputFailure>,
    fail_transaction: bool,
    resumable: bool,
    runs: Mutex<Vec<usize>>,
    committed: Mutex<Option<Vec<TaskReport>>>,
    cleaned_up: Mutex<Option<Vec<TaskReport>>>,
}

impl ScriptedInput {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            partitions: Vec::new(),
            failures: HashMap::new(),
            fail_transaction: false,
            resumable: false,
            runs: Mutex::new(Vec::new()),
            committed: Mutex::new(None),
            cleaned_up: Mutex::new(None),
        }
    }

    pub fn with_partition(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.partitions.push(rows);
        self
    }

    pub fn with_failure(mut self, partition: usize, failure: InputFailure) -> Self {
        self.failures.insert(partition, failure);
        self
    }

    pub fn failing_transaction(mut self) -> Self {
        self.fail_transaction = true;
        self
    }

    pub fn resumable(mut self) -> Self {
        self.resumable = true;
        self
    }

    pub fn rows(&self, partition: usize) -> &[Vec<Value>] {
        &self.partitions[partition]
    }

    /// Partitions run so far, sorted.
    pub fn runs(&self) -> Vec<usize> {
        let mut runs = self.runs.lock().clone();
        runs.sort_unstable();
        runs
    }

    pub fn committed_reports(&self) -> Option<Vec<TaskReport>> {
        self.committed.lock().clone()
    }

    pub fn cleanup_reports(&self) -> Option<Vec<TaskReport>> {
        self.cleaned_up.lock().clone()
    }
}

impl InputPlugin for ScriptedInput {
    fn name(&self) -> &str {
        "scripted"
    }

    fn transaction(&self, _config: &ConfigSource) -> Result<InputTransaction, PluginError> {
        if self.fail_transaction {
            return Err(PluginError::config("scripted input rejects its config"));
        }
        let mut task = TaskSource::new();
        task.set("partitions", self.partitions.len())?;
        Ok(InputTransaction::new(
            task,
            self.schema.clone(),
            self.partitions.len(),
        ))
    }

    fn resume(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
    ) -> Result<(), PluginError> {
        if self.resumable {
            Ok(())
        } else {
            Err(PluginError::ResumeUnsupported(self.name().to_string()))
        }
    }

    fn run(
        &self,
        session: &ExecSession,
        _task: &TaskSource,
        schema: &Schema,
        task_index: usize,
        output: &mut dyn PageOutput,
    ) -> Result<TaskReport, PluginError> {
        self.runs.lock().push(task_index);
        let failure = self.failures.get(&task_index).copied();
        if let Some(InputFailure::Immediately) = failure {
            return Err(PluginError::data(format!(
                "partition {task_index} failed to start"
            )));
        }

        let mut builder = session.page_builder(schema, output)?;
        for (emitted, row) in self.partitions[task_index].iter().enumerate() {
            if let Some(InputFailure::AfterRows(limit)) = failure {
                if emitted == limit {
                    builder.flush()?;
                    return Err(PluginError::data(format!(
                        "partition {task_index} failed after {limit} rows"
                    )));
                }
            }
            for (column, value) in row.iter().enumerate() {
                builder.set_value(column, value)?;
            }
            builder.add_record()?;
        }
        builder.finish()?;
        builder.close()?;

        let mut report = TaskReport::new();
        report
            .set("partition", task_index)?
            .set("records", self.partitions[task_index].len())?;
        Ok(report)
    }

    fn commit(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        task_count: usize,
        reports: &[TaskReport],
    ) -> Result<ConfigDiff, PluginError> {
        *self.committed.lock() = Some(reports.to_vec());
        let mut diff = ConfigDiff::new();
        diff.set("task_count", task_count)?;
        Ok(diff)
    }

    fn cleanup(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        successful: &[TaskReport],
    ) -> Result<(), PluginError> {
        *self.cleaned_up.lock() = Some(successful.to_vec());
        Ok(())
    }
}
