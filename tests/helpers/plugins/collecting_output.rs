use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::exec::ExecSession;
use crate::engine::page::{Page, PageOutput, PageReader};
use crate::engine::plugin::{OutputPlugin, PluginError, TransactionalPageOutput};
use crate::engine::types::{Schema, Value};
use crate::shared::config::{ConfigDiff, ConfigSource, TaskReport, TaskSource};

#[derive(Debug, Clone, Copy)]
pub enum OutputFailure {
    OnOpen,
    /// Raise on the first page received.
    OnAdd,
    OnCommit,
}

#[derive(Default)]
struct Shared {
    records: BTreeMap<usize, Vec<Vec<Value>>>,
    committed: Vec<usize>,
    aborted: Vec<usize>,
    closed: Vec<usize>,
    commit_reports: Option<Vec<TaskReport>>,
    cleanup_reports: Option<Vec<TaskReport>>,
    transaction_schema: Option<Schema>,
}

/// Output plugin decoding every page it receives and keeping the records of
/// committed partitions.
pub struct CollectingOutput {
    failures: HashMap<usize, OutputFailure>,
    resumable: bool,
    fail_cleanup: bool,
    shared: Arc<Mutex<Shared>>,
}

impl CollectingOutput {
    pub fn new() -> Self {
        Self {
            failures: HashMap::new(),
            resumable: false,
            fail_cleanup: false,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    pub fn with_failure(mut self, partition: usize, failure: OutputFailure) -> Self {
        self.failures.insert(partition, failure);
        self
    }

    pub fn resumable(mut self) -> Self {
        self.resumable = true;
        self
    }

    pub fn failing_cleanup(mut self) -> Self {
        self.fail_cleanup = true;
        self
    }

    pub fn records(&self, partition: usize) -> Option<Vec<Vec<Value>>> {
        self.shared.lock().records.get(&partition).cloned()
    }

    pub fn committed(&self) -> Vec<usize> {
        let mut committed = self.shared.lock().committed.clone();
        committed.sort_unstable();
        committed
    }

    pub fn aborted(&self) -> Vec<usize> {
        let mut aborted = self.shared.lock().aborted.clone();
        aborted.sort_unstable();
        aborted
    }

    pub fn closed(&self) -> Vec<usize> {
        let mut closed = self.shared.lock().closed.clone();
        closed.sort_unstable();
        closed
    }

    pub fn commit_reports(&self) -> Option<Vec<TaskReport>> {
        self.shared.lock().commit_reports.clone()
    }

    pub fn cleanup_reports(&self) -> Option<Vec<TaskReport>> {
        self.shared.lock().cleanup_reports.clone()
    }

    pub fn transaction_schema(&self) -> Option<Schema> {
        self.shared.lock().transaction_schema.clone()
    }
}

impl OutputPlugin for CollectingOutput {
    fn name(&self) -> &str {
        "collecting"
    }

    fn transaction(
        &self,
        _config: &ConfigSource,
        schema: &Schema,
        task_count: usize,
    ) -> Result<TaskSource, PluginError> {
        self.shared.lock().transaction_schema = Some(schema.clone());
        let mut task = TaskSource::new();
        task.set("task_count", task_count)?;
        Ok(task)
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

    fn open(
        &self,
        _session: &ExecSession,
        _task: &TaskSource,
        schema: &Schema,
        task_index: usize,
    ) -> Result<Box<dyn TransactionalPageOutput>, PluginError> {
        let failure = self.failures.get(&task_index).copied();
        if let Some(OutputFailure::OnOpen) = failure {
            return Err(PluginError::data(format!(
                "partition {task_index} could not open"
            )));
        }
        Ok(Box::new(CollectingPageOutput {
            partition: task_index,
            reader: PageReader::new(schema),
            rows: Vec::new(),
            failure,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn commit(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        reports: &[TaskReport],
    ) -> Result<ConfigDiff, PluginError> {
        self.shared.lock().commit_reports = Some(reports.to_vec());
        let mut diff = ConfigDiff::new();
        diff.set("partitions_written", reports.len())?;
        Ok(diff)
    }

    fn cleanup(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        successful: &[TaskReport],
    ) -> Result<(), PluginError> {
        self.shared.lock().cleanup_reports = Some(successful.to_vec());
        if self.fail_cleanup {
            return Err(PluginError::data("cleanup failed"));
        }
        Ok(())
    }
}

struct CollectingPageOutput {
    partition: usize,
    reader: PageReader,
    rows: Vec<Vec<Value>>,
    failure: Option<OutputFailure>,
    shared: Arc<Mutex<Shared>>,
}

impl PageOutput for CollectingPageOutput {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        if let Some(OutputFailure::OnAdd) = self.failure {
            return Err(PluginError::data(format!(
                "partition {} rejected a page",
                self.partition
            )));
        }
        self.reader.set_page(page)?;
        while self.reader.next_record()? {
            self.rows.push(self.reader.record_values());
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    fn close(&mut self) {
        self.reader.close();
        self.shared.lock().closed.push(self.partition);
    }
}

impl TransactionalPageOutput for CollectingPageOutput {
    fn abort(&mut self) {
        self.shared.lock().aborted.push(self.partition);
    }

    fn commit(&mut self) -> Result<TaskReport, PluginError> {
        if let Some(OutputFailure::OnCommit) = self.failure {
            return Err(PluginError::data(format!(
                "partition {} failed to commit",
                self.partition
            )));
        }
        let mut shared = self.shared.lock();
        shared
            .records
            .insert(self.partition, std::mem::take(&mut self.rows));
        shared.committed.push(self.partition);

        let mut report = TaskReport::new();
        report
            .set("partition", self.partition)?
            .set("records", shared.records[&self.partition].len())?;
        Ok(report)
    }
}
