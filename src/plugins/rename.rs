use std::collections::BTreeMap;

use serde::Deserialize;

use crate::engine::exec::ExecSession;
use crate::engine::page::PageOutput;
use crate::engine::plugin::{FilterPlugin, FilterTransaction, PluginError};
use crate::engine::types::Schema;
use crate::shared::config::{ConfigSource, TaskSource};

/// Renames columns: `{"columns": {"old": "new"}}`. The page layout depends
/// only on column types, so pages pass through untouched.
#[derive(Debug, Default)]
pub struct RenameFilterPlugin;

#[derive(Debug, Deserialize)]
struct RenameTask {
    #[serde(default)]
    columns: BTreeMap<String, String>,
}

impl RenameFilterPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl FilterPlugin for RenameFilterPlugin {
    fn name(&self) -> &str {
        "rename"
    }

    fn transaction(
        &self,
        config: &ConfigSource,
        input_schema: &Schema,
    ) -> Result<FilterTransaction, PluginError> {
        let task: RenameTask = config.load_task()?;
        if let Some(missing) = task
            .columns
            .keys()
            .find(|name| input_schema.lookup_column(name).is_none())
        {
            return Err(PluginError::config(format!(
                "column '{missing}' to rename does not exist"
            )));
        }

        let output_schema = input_schema
            .columns()
            .iter()
            .fold(Schema::builder(), |builder, column| {
                let name = task
                    .columns
                    .get(column.name())
                    .map(String::as_str)
                    .unwrap_or(column.name());
                builder.add(name, column.type_tag())
            })
            .build();

        Ok(FilterTransaction::new(config.clone(), output_schema))
    }

    fn open(
        &self,
        _session: &ExecSession,
        _task: &TaskSource,
        _input_schema: &Schema,
        _output_schema: &Schema,
        output: Box<dyn PageOutput>,
    ) -> Result<Box<dyn PageOutput>, PluginError> {
        Ok(output)
    }
}
