use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::exec::ExecSession;
use crate::engine::page::{Page, PageBuilder, PageOutput, PageReader};
use crate::engine::plugin::{FilterPlugin, FilterTransaction, PluginError};
use crate::engine::types::{Column, ColumnReader, ColumnVisitor, ColumnWriter, Schema};
use crate::shared::config::{ConfigSource, TaskSource};

const LOG_TARGET: &str = "plugins::remove_columns";

/// Drops columns by name, either `{"remove": [..]}` or `{"keep": [..]}`.
/// Unknown names are rejected unless `accept_unmatched_columns` is set.
#[derive(Debug, Default)]
pub struct RemoveColumnsFilterPlugin;

#[derive(Debug, Deserialize)]
struct RemoveColumnsConfig {
    remove: Option<Vec<String>>,
    keep: Option<Vec<String>>,
    #[serde(default)]
    accept_unmatched_columns: bool,
}

/// Input column index of every output column.
#[derive(Debug, Serialize, Deserialize)]
struct RemoveColumnsTask {
    sources: Vec<usize>,
}

impl RemoveColumnsFilterPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl RemoveColumnsConfig {
    fn surviving_columns(&self, schema: &Schema) -> Result<Vec<usize>, PluginError> {
        let (names, keep) = match (&self.remove, &self.keep) {
            (Some(names), None) => (names, false),
            (None, Some(names)) => (names, true),
            _ => {
                return Err(PluginError::config(
                    "exactly one of 'remove' or 'keep' must be set",
                ));
            }
        };
        if !self.accept_unmatched_columns {
            if let Some(missing) = names.iter().find(|n| schema.lookup_column(n).is_none()) {
                return Err(PluginError::config(format!("column '{missing}' does not exist")));
            }
        }

        Ok(schema
            .columns()
            .iter()
            .filter(|column| names.iter().any(|n| n == column.name()) == keep)
            .map(Column::index)
            .collect())
    }
}

impl FilterPlugin for RemoveColumnsFilterPlugin {
    fn name(&self) -> &str {
        "remove_columns"
    }

    fn transaction(
        &self,
        config: &ConfigSource,
        input_schema: &Schema,
    ) -> Result<FilterTransaction, PluginError> {
        let config: RemoveColumnsConfig = config.load_task()?;
        let sources = config.surviving_columns(input_schema)?;

        let output_schema = sources
            .iter()
            .fold(Schema::builder(), |builder, &source| {
                let column = input_schema.column(source);
                builder.add(column.name(), column.type_tag())
            })
            .build();

        debug!(
            target: LOG_TARGET,
            kept = output_schema.column_count(),
            removed = input_schema.column_count() - output_schema.column_count(),
            "Columns selected"
        );
        let task = ConfigSource::from_task(&RemoveColumnsTask { sources })?;
        Ok(FilterTransaction::new(task, output_schema))
    }

    fn open(
        &self,
        session: &ExecSession,
        task: &TaskSource,
        input_schema: &Schema,
        output_schema: &Schema,
        output: Box<dyn PageOutput>,
    ) -> Result<Box<dyn PageOutput>, PluginError> {
        let task: RemoveColumnsTask = task.load_task()?;
        if task.sources.len() != output_schema.column_count()
            || task.sources.iter().any(|&s| s >= input_schema.column_count())
        {
            return Err(PluginError::config(
                "remove_columns task does not match the negotiated schemas",
            ));
        }

        Ok(Box::new(RemoveColumnsOutput {
            reader: PageReader::new(input_schema),
            builder: session.page_builder(output_schema, output)?,
            output_schema: output_schema.clone(),
            sources: task.sources,
        }))
    }
}

struct RemoveColumnsOutput {
    reader: PageReader,
    builder: PageBuilder<Box<dyn PageOutput>>,
    output_schema: Schema,
    sources: Vec<usize>,
}

impl PageOutput for RemoveColumnsOutput {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        self.reader.set_page(page)?;
        while self.reader.next_record()? {
            let mut copier = ColumnCopier {
                reader: &self.reader,
                builder: &mut self.builder,
                sources: &self.sources,
            };
            self.output_schema.visit_columns(&mut copier);
            self.builder.add_record()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        self.builder.finish()
    }

    fn close(&mut self) {
        self.reader.close();
        if let Err(err) = self.builder.close() {
            debug!(target: LOG_TARGET, error = %err, "Dropping pending page on close");
        }
    }
}

/// Copies one record from the input to the output position of each column.
struct ColumnCopier<'a> {
    reader: &'a PageReader,
    builder: &'a mut PageBuilder<Box<dyn PageOutput>>,
    sources: &'a [usize],
}

impl<'a> ColumnCopier<'a> {
    /// Typed handles on the source and target of `column`, or `None` after
    /// marking a null source on the target.
    fn handles(
        &mut self,
        column: &Column,
    ) -> Option<(ColumnReader<'a>, ColumnWriter<'_, Box<dyn PageOutput>>)> {
        let tag = column.type_tag();
        let from = tag.reader(self.reader, self.sources[column.index()]);
        let mut to = tag.writer(&mut *self.builder, column.index());
        if from.is_null() {
            to.set_null();
            None
        } else {
            Some((from, to))
        }
    }
}

impl ColumnVisitor for ColumnCopier<'_> {
    fn boolean_column(&mut self, column: &Column) {
        if let Some((from, mut to)) = self.handles(column) {
            to.set_boolean(from.get_boolean());
        }
    }

    fn int64_column(&mut self, column: &Column) {
        if let Some((from, mut to)) = self.handles(column) {
            to.set_int64(from.get_int64());
        }
    }

    fn float64_column(&mut self, column: &Column) {
        if let Some((from, mut to)) = self.handles(column) {
            to.set_float64(from.get_float64());
        }
    }

    fn string_column(&mut self, column: &Column) {
        if let Some((from, mut to)) = self.handles(column) {
            to.set_string(from.get_string());
        }
    }

    fn timestamp_column(&mut self, column: &Column) {
        if let Some((from, mut to)) = self.handles(column) {
            to.set_timestamp(from.get_timestamp());
        }
    }
}
