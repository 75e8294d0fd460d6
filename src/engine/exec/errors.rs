use std::fmt;

use thiserror::Error;

use crate::engine::plugin::PluginError;

use super::{PartitionOutcome, ResumeState, TransactionStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionSide {
    Input,
    Output,
}

impl fmt::Display for PartitionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionSide::Input => f.write_str("input"),
            PartitionSide::Output => f.write_str("output"),
        }
    }
}

/// One side of one partition raised.
#[derive(Debug, Error)]
#[error("Partition {partition} {side} failed: {error}")]
pub struct PartitionFailure {
    pub partition: usize,
    pub side: PartitionSide,
    #[source]
    pub error: PluginError,
}

impl PartitionFailure {
    pub fn new(partition: usize, side: PartitionSide, error: PluginError) -> Self {
        Self {
            partition,
            side,
            error,
        }
    }

    pub fn is_channel_closed(&self) -> bool {
        self.error.is_channel_closed()
    }
}

/// A run where at least one partition aborted.
#[derive(Debug)]
pub struct PartialExecution {
    /// Representative failure.
    pub cause: PartitionFailure,
    /// Every other failure of the run.
    pub suppressed: Vec<PartitionFailure>,
    pub outcomes: Vec<PartitionOutcome>,
    /// Persist this to retry only the aborted partitions.
    pub resume_state: ResumeState,
    /// Cleanup failures; logged, never raised.
    pub ignored_errors: Vec<String>,
}

impl PartialExecution {
    pub fn committed_partitions(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| o.is_committed())
            .map(|o| o.partition)
            .collect()
    }

    pub fn aborted_partitions(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_committed())
            .map(|o| o.partition)
            .collect()
    }
}

impl fmt::Display for PartialExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} partitions aborted: {}",
            self.aborted_partitions().len(),
            self.outcomes.len(),
            self.cause
        )?;
        if !self.suppressed.is_empty() {
            write!(f, " ({} suppressed)", self.suppressed.len())?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Raised outside of the partitions; nothing was run, or a run finished
    /// but could not be committed.
    #[error("Transaction failed at {stage}: {source}")]
    Transaction {
        stage: TransactionStage,
        #[source]
        source: PluginError,
    },

    #[error("{0}")]
    Partial(Box<PartialExecution>),
}

impl ExecutionError {
    pub fn transaction(stage: TransactionStage, source: PluginError) -> Self {
        ExecutionError::Transaction { stage, source }
    }

    pub fn as_partial(&self) -> Option<&PartialExecution> {
        match self {
            ExecutionError::Partial(partial) => Some(partial),
            ExecutionError::Transaction { .. } => None,
        }
    }
}

/// Picks the failure to surface: the first one that is not a channel
/// teardown, else the first one. `failures` must be ordered by partition,
/// input before output. Everything else is returned as suppressed.
pub fn select_representative(
    mut failures: Vec<PartitionFailure>,
) -> Option<(PartitionFailure, Vec<PartitionFailure>)> {
    let position = representative_index(&failures)?;
    let cause = failures.remove(position);
    Some((cause, failures))
}

pub(super) fn representative_index(failures: &[PartitionFailure]) -> Option<usize> {
    if failures.is_empty() {
        return None;
    }
    Some(
        failures
            .iter()
            .position(|f| !f.is_channel_closed())
            .unwrap_or(0),
    )
}
