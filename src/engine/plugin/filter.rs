use crate::engine::exec::ExecSession;
use crate::engine::page::PageOutput;
use crate::engine::types::Schema;
use crate::shared::config::{ConfigSource, TaskSource};

use super::PluginError;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterTransaction {
    pub task: TaskSource,
    pub output_schema: Schema,
}

impl FilterTransaction {
    pub fn new(task: TaskSource, output_schema: Schema) -> Self {
        Self {
            task,
            output_schema,
        }
    }
}

/// Page-to-page transformation between input and output.
pub trait FilterPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn transaction(
        &self,
        config: &ConfigSource,
        input_schema: &Schema,
    ) -> Result<FilterTransaction, PluginError>;

    /// Wraps `output` with this filter. Pages added to the returned sink are
    /// in `input_schema`; pages reaching `output` are in `output_schema`.
    fn open(
        &self,
        session: &ExecSession,
        task: &TaskSource,
        input_schema: &Schema,
        output_schema: &Schema,
        output: Box<dyn PageOutput>,
    ) -> Result<Box<dyn PageOutput>, PluginError>;
}
