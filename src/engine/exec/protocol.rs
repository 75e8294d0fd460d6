use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, error, info, warn};

use crate::engine::plugin::{FilterChain, InputTransaction, PluginError};
use crate::engine::types::Schema;
use crate::shared::config::{ConfigDiff, TaskReport, TaskSource};

use super::worker::{PartitionContext, run_partition};
use super::{ExecSession, ExecutionError, PartitionRun, Pipeline, ResumeState, TransactionStage};

const LOG_TARGET: &str = "engine::exec::protocol";

/// Everything the partitions of one run share, fixed at negotiation time.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub input_task: TaskSource,
    pub input_schema: Schema,
    pub filters: FilterChain,
    pub output_task: TaskSource,
    /// Schema of the pages reaching the output.
    pub executor_schema: Schema,
    pub task_count: usize,
}

impl ExecutionPlan {
    pub fn to_resume_state(
        &self,
        input_reports: Vec<Option<TaskReport>>,
        output_reports: Vec<Option<TaskReport>>,
    ) -> ResumeState {
        ResumeState {
            input_task: self.input_task.clone(),
            input_schema: self.input_schema.clone(),
            filter_tasks: self.filters.tasks(),
            filter_schemas: self.filters.output_schemas(),
            output_task: self.output_task.clone(),
            executor_schema: self.executor_schema.clone(),
            task_count: self.task_count,
            input_reports,
            output_reports,
        }
    }
}

/// The negotiation handshake and the run, one explicit step at a time:
/// input, filters, output, partitions, commit, cleanup.
pub struct TransactionProtocol<'a> {
    pipeline: &'a Pipeline,
    session: ExecSession,
    stage: TransactionStage,
}

impl<'a> TransactionProtocol<'a> {
    pub fn new(pipeline: &'a Pipeline, session: ExecSession) -> Self {
        Self {
            pipeline,
            session,
            stage: TransactionStage::InputBegin,
        }
    }

    pub fn stage(&self) -> TransactionStage {
        self.stage
    }

    pub fn negotiate_input(&mut self) -> Result<InputTransaction, ExecutionError> {
        self.enter(TransactionStage::InputBegin);
        let input = self.pipeline.input();
        let transaction = input
            .transaction(self.pipeline.input_config())
            .map_err(|e| self.fail(e))?;

        info!(
            target: LOG_TARGET,
            input = input.name(),
            task_count = transaction.task_count,
            columns = transaction.schema.column_count(),
            "Input negotiated"
        );
        Ok(transaction)
    }

    pub fn negotiate_filters(&mut self, input_schema: &Schema) -> Result<FilterChain, ExecutionError> {
        self.enter(TransactionStage::FilterBegin);
        FilterChain::negotiate(self.pipeline.filters(), input_schema).map_err(|(position, e)| {
            warn!(target: LOG_TARGET, position, "Filter rejected its configuration");
            self.fail(e)
        })
    }

    pub fn negotiate_output(
        &mut self,
        schema: &Schema,
        task_count: usize,
    ) -> Result<TaskSource, ExecutionError> {
        self.enter(TransactionStage::OutputBegin);
        let output = self.pipeline.output();
        let task = output
            .transaction(self.pipeline.output_config(), schema, task_count)
            .map_err(|e| self.fail(e))?;

        info!(
            target: LOG_TARGET,
            output = output.name(),
            task_count,
            "Output negotiated"
        );
        Ok(task)
    }

    /// Rebuilds the plan of an earlier run and lets every plugin accept it.
    pub fn resume_plan(&mut self, state: &ResumeState) -> Result<ExecutionPlan, ExecutionError> {
        self.enter(TransactionStage::InputBegin);
        if state.input_reports.len() != state.task_count
            || state.output_reports.len() != state.task_count
        {
            return Err(self.fail(PluginError::config(format!(
                "resume state holds {} input and {} output reports for {} partitions",
                state.input_reports.len(),
                state.output_reports.len(),
                state.task_count
            ))));
        }
        self.pipeline
            .input()
            .resume(&state.input_task, &state.input_schema, state.task_count)
            .map_err(|e| self.fail(e))?;

        self.enter(TransactionStage::FilterBegin);
        let filters = FilterChain::restore(
            &self.pipeline.filter_plugins(),
            &state.input_schema,
            &state.filter_tasks,
            &state.filter_schemas,
        )
        .map_err(|e| self.fail(e))?;

        self.enter(TransactionStage::OutputBegin);
        self.pipeline
            .output()
            .resume(&state.output_task, &state.executor_schema, state.task_count)
            .map_err(|e| self.fail(e))?;

        info!(
            target: LOG_TARGET,
            task_count = state.task_count,
            pending = state.pending_partitions().len(),
            "Resuming transaction"
        );
        Ok(ExecutionPlan {
            input_task: state.input_task.clone(),
            input_schema: state.input_schema.clone(),
            filters,
            output_task: state.output_task.clone(),
            executor_schema: state.executor_schema.clone(),
            task_count: state.task_count,
        })
    }

    /// Runs `partitions` concurrently and waits for all of them. Results are
    /// ordered by partition index, not completion.
    pub async fn run_partitions(
        &mut self,
        plan: &ExecutionPlan,
        partitions: &[usize],
    ) -> Vec<PartitionRun> {
        self.enter(TransactionStage::Run);
        let context = Arc::new(PartitionContext {
            session: self.session.clone(),
            input: Arc::clone(self.pipeline.input()),
            output: Arc::clone(self.pipeline.output()),
            plan: plan.clone(),
        });

        let total = partitions.len();
        info!(
            target: LOG_TARGET,
            partitions = total,
            task_count = plan.task_count,
            "Starting partitions"
        );

        let mut running: FuturesUnordered<_> = partitions
            .iter()
            .map(|&partition| run_partition(Arc::clone(&context), partition))
            .collect();

        let mut runs = Vec::with_capacity(total);
        while let Some(run) = running.next().await {
            if !run.is_committed() {
                warn!(target: LOG_TARGET, partition = run.partition, "Partition aborted");
            }
            runs.push(run);
            info!(target: LOG_TARGET, "{} / {} partitions finished", runs.len(), total);
        }
        runs.sort_by_key(|run| run.partition);
        runs
    }

    /// Output commit, then input commit. Only valid once every partition committed.
    pub fn commit(
        &mut self,
        plan: &ExecutionPlan,
        input_reports: &[TaskReport],
        output_reports: &[TaskReport],
    ) -> Result<ConfigDiff, ExecutionError> {
        self.enter(TransactionStage::OutputEnd);
        let output_diff = self
            .pipeline
            .output()
            .commit(
                &plan.output_task,
                &plan.executor_schema,
                plan.task_count,
                output_reports,
            )
            .map_err(|e| self.fail(e))?;

        self.enter(TransactionStage::FilterEnd);

        self.enter(TransactionStage::InputEnd);
        let input_diff = self
            .pipeline
            .input()
            .commit(
                &plan.input_task,
                &plan.input_schema,
                plan.task_count,
                input_reports,
            )
            .map_err(|e| self.fail(e))?;

        let mut diff = ConfigDiff::new();
        diff.set_nested("in", input_diff)
            .set_nested("out", output_diff);
        info!(target: LOG_TARGET, task_count = plan.task_count, "Transaction committed");
        Ok(diff)
    }

    /// Cleans both plugins up with the reports of the committed partitions.
    /// Failures are logged and returned, never raised.
    pub fn cleanup(
        &mut self,
        plan: &ExecutionPlan,
        input_reports: &[TaskReport],
        output_reports: &[TaskReport],
    ) -> Vec<String> {
        self.enter(TransactionStage::Cleanup);
        let mut ignored = Vec::new();

        if let Err(err) = self.pipeline.output().cleanup(
            &plan.output_task,
            &plan.executor_schema,
            plan.task_count,
            output_reports,
        ) {
            warn!(target: LOG_TARGET, error = %err, "Output cleanup failed");
            ignored.push(format!("output cleanup: {err}"));
        }
        if let Err(err) = self.pipeline.input().cleanup(
            &plan.input_task,
            &plan.input_schema,
            plan.task_count,
            input_reports,
        ) {
            warn!(target: LOG_TARGET, error = %err, "Input cleanup failed");
            ignored.push(format!("input cleanup: {err}"));
        }

        info!(
            target: LOG_TARGET,
            committed = output_reports.len(),
            task_count = plan.task_count,
            "Cleaned up"
        );
        ignored
    }

    fn enter(&mut self, stage: TransactionStage) {
        debug!(target: LOG_TARGET, from = %self.stage, to = %stage, "Stage transition");
        self.stage = stage;
    }

    fn fail(&self, source: PluginError) -> ExecutionError {
        error!(target: LOG_TARGET, stage = %self.stage, error = %source, "Transaction failed");
        ExecutionError::transaction(self.stage, source)
    }
}
