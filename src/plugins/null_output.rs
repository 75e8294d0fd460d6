use crate::engine::exec::ExecSession;
use crate::engine::page::{Page, PageOutput};
use crate::engine::plugin::{OutputPlugin, PluginError, TransactionalPageOutput};
use crate::engine::types::Schema;
use crate::shared::config::{ConfigSource, TaskReport, TaskSource};

/// Discards every page, reporting how many records went by.
#[derive(Debug, Default)]
pub struct NullOutputPlugin;

impl NullOutputPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl OutputPlugin for NullOutputPlugin {
    fn name(&self) -> &str {
        "null"
    }

    fn transaction(
        &self,
        _config: &ConfigSource,
        _schema: &Schema,
        _task_count: usize,
    ) -> Result<TaskSource, PluginError> {
        Ok(TaskSource::new())
    }

    fn resume(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn open(
        &self,
        _session: &ExecSession,
        _task: &TaskSource,
        _schema: &Schema,
        _task_index: usize,
    ) -> Result<Box<dyn TransactionalPageOutput>, PluginError> {
        Ok(Box::new(NullPageOutput::default()))
    }
}

#[derive(Debug, Default)]
struct NullPageOutput {
    records: u64,
    pages: u64,
}

impl PageOutput for NullPageOutput {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        self.records += page.record_count() as u64;
        self.pages += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    fn close(&mut self) {}
}

impl TransactionalPageOutput for NullPageOutput {
    fn abort(&mut self) {}

    fn commit(&mut self) -> Result<TaskReport, PluginError> {
        let mut report = TaskReport::new();
        report.set("records", self.records)?.set("pages", self.pages)?;
        Ok(report)
    }
}
