use crate::shared::config::{ConfigDiff, TaskReport};

use super::PartitionSide;

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionState {
    Committed {
        input_report: TaskReport,
        output_report: TaskReport,
    },
    /// The writer was aborted. `side` and `cause` describe the partition's
    /// representative failure.
    Aborted { side: PartitionSide, cause: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionOutcome {
    pub partition: usize,
    pub state: PartitionState,
}

impl PartitionOutcome {
    pub fn committed(partition: usize, input_report: TaskReport, output_report: TaskReport) -> Self {
        Self {
            partition,
            state: PartitionState::Committed {
                input_report,
                output_report,
            },
        }
    }

    pub fn aborted(partition: usize, side: PartitionSide, cause: impl Into<String>) -> Self {
        Self {
            partition,
            state: PartitionState::Aborted {
                side,
                cause: cause.into(),
            },
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.state, PartitionState::Committed { .. })
    }

    pub fn input_report(&self) -> Option<&TaskReport> {
        match &self.state {
            PartitionState::Committed { input_report, .. } => Some(input_report),
            PartitionState::Aborted { .. } => None,
        }
    }

    pub fn output_report(&self) -> Option<&TaskReport> {
        match &self.state {
            PartitionState::Committed { output_report, .. } => Some(output_report),
            PartitionState::Aborted { .. } => None,
        }
    }
}

/// Result of a run where every partition committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    config_diff: ConfigDiff,
    outcomes: Vec<PartitionOutcome>,
    ignored_errors: Vec<String>,
}

impl ExecutionResult {
    pub(super) fn new(
        config_diff: ConfigDiff,
        outcomes: Vec<PartitionOutcome>,
        ignored_errors: Vec<String>,
    ) -> Self {
        Self {
            config_diff,
            outcomes,
            ignored_errors,
        }
    }

    /// `{"in": <input diff>, "out": <output diff>}`.
    pub fn config_diff(&self) -> &ConfigDiff {
        &self.config_diff
    }

    pub fn outcomes(&self) -> &[PartitionOutcome] {
        &self.outcomes
    }

    pub fn task_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn input_reports(&self) -> Vec<&TaskReport> {
        self.outcomes.iter().filter_map(|o| o.input_report()).collect()
    }

    pub fn output_reports(&self) -> Vec<&TaskReport> {
        self.outcomes.iter().filter_map(|o| o.output_report()).collect()
    }

    /// Cleanup failures, logged and otherwise ignored.
    pub fn ignored_errors(&self) -> &[String] {
        &self.ignored_errors
    }
}
