use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::engine::exec::ExecSession;
use crate::engine::page::{PageBuilder, PageOutput};
use crate::engine::plugin::{InputPlugin, InputTransaction, PluginError};
use crate::engine::types::{ColumnConfig, Schema, Value};
use crate::shared::config::{ConfigDiff, ConfigSource, TaskReport, TaskSource};

const LOG_TARGET: &str = "plugins::inline_input";

/// Reads rows written straight into the configuration:
///
/// ```json
/// {"columns": [{"name": "id", "type": "long"}], "rows": [[1], [2]], "partitions": 2}
/// ```
///
/// Row `i` goes to partition `i % partitions`.
#[derive(Debug, Default)]
pub struct InlineInputPlugin;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineTask {
    columns: Vec<ColumnConfig>,
    #[serde(default)]
    rows: Vec<Vec<JsonValue>>,
    #[serde(default = "default_partitions")]
    partitions: usize,
}

fn default_partitions() -> usize {
    1
}

impl InlineInputPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl InlineTask {
    fn validate(&self, schema: &Schema) -> Result<(), PluginError> {
        if self.partitions == 0 {
            return Err(PluginError::config("'partitions' must be at least 1"));
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != schema.column_count() {
                return Err(PluginError::config(format!(
                    "row {index} has {} values, {} columns declared",
                    row.len(),
                    schema.column_count()
                )));
            }
            for (column, raw) in schema.columns().iter().zip(row) {
                Value::from_json(column.type_tag(), raw)?;
            }
        }
        Ok(())
    }

    /// Writes the rows of partition `task_index` and finishes the builder.
    fn emit<O: PageOutput>(
        &self,
        schema: &Schema,
        task_index: usize,
        builder: &mut PageBuilder<O>,
    ) -> Result<u64, PluginError> {
        let mut records = 0u64;
        for row in self.rows.iter().skip(task_index).step_by(self.partitions.max(1)) {
            for (column, raw) in schema.columns().iter().zip(row) {
                let value = Value::from_json(column.type_tag(), raw)?;
                builder.set_value(column.index(), &value)?;
            }
            builder.add_record()?;
            records += 1;
        }
        builder.finish()?;
        Ok(records)
    }
}

impl InputPlugin for InlineInputPlugin {
    fn name(&self) -> &str {
        "inline"
    }

    fn transaction(&self, config: &ConfigSource) -> Result<InputTransaction, PluginError> {
        let task: InlineTask = config.load_task()?;
        let schema = Schema::from_configs(&task.columns);
        task.validate(&schema)?;

        Ok(InputTransaction::new(
            ConfigSource::from_task(&task)?,
            schema,
            task.partitions,
        ))
    }

    fn resume(
        &self,
        task: &TaskSource,
        schema: &Schema,
        task_count: usize,
    ) -> Result<(), PluginError> {
        let task: InlineTask = task.load_task()?;
        if task.partitions != task_count {
            return Err(PluginError::config(format!(
                "task was negotiated for {} partitions, resuming with {task_count}",
                task.partitions
            )));
        }
        task.validate(schema)
    }

    fn run(
        &self,
        session: &ExecSession,
        task: &TaskSource,
        schema: &Schema,
        task_index: usize,
        output: &mut dyn PageOutput,
    ) -> Result<TaskReport, PluginError> {
        let task: InlineTask = task.load_task()?;
        let mut builder = session.page_builder(schema, output)?;

        let emitted = task.emit(schema, task_index, &mut builder);
        let closed = builder.close();
        let records = match emitted {
            Ok(records) => records,
            Err(err) => {
                if let Err(close_err) = closed {
                    debug!(target: LOG_TARGET, error = %close_err, "Close after failed partition");
                }
                return Err(err);
            }
        };
        closed?;

        debug!(target: LOG_TARGET, partition = task_index, records, "Inline rows emitted");
        let mut report = TaskReport::new();
        report.set("records", records)?;
        Ok(report)
    }

    fn commit(
        &self,
        _task: &TaskSource,
        _schema: &Schema,
        _task_count: usize,
        reports: &[TaskReport],
    ) -> Result<ConfigDiff, PluginError> {
        let mut total = 0u64;
        for report in reports {
            total += report.get_or("records", 0u64)?;
        }
        let mut diff = ConfigDiff::new();
        diff.set("last_row_count", total)?;
        Ok(diff)
    }
}
