use serde::{Deserialize, Serialize};

use crate::engine::types::Schema;
use crate::shared::config::{TaskReport, TaskSource};

/// Everything needed to re-enter a run at the partition stage.
///
/// A partition is pending until both its input and output report exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    pub input_task: TaskSource,
    pub input_schema: Schema,
    #[serde(default)]
    pub filter_tasks: Vec<TaskSource>,
    #[serde(default)]
    pub filter_schemas: Vec<Schema>,
    pub output_task: TaskSource,
    pub executor_schema: Schema,
    pub task_count: usize,
    pub input_reports: Vec<Option<TaskReport>>,
    pub output_reports: Vec<Option<TaskReport>>,
}

impl ResumeState {
    pub fn pending_partitions(&self) -> Vec<usize> {
        (0..self.task_count)
            .filter(|&i| !self.is_committed(i))
            .collect()
    }

    pub fn is_committed(&self, partition: usize) -> bool {
        matches!(
            (
                self.input_reports.get(partition),
                self.output_reports.get(partition)
            ),
            (Some(Some(_)), Some(Some(_)))
        )
    }

    pub fn is_complete(&self) -> bool {
        self.pending_partitions().is_empty()
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
