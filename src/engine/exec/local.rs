use tracing::{error, info, warn};

use crate::shared::config::TaskReport;

use super::errors::select_representative;
use super::{
    ExecSession, ExecutionError, ExecutionPlan, ExecutionResult, PartialExecution,
    PartitionOutcome, Pipeline, ResumeState, TransactionProtocol,
};

const LOG_TARGET: &str = "engine::exec::local";

/// Runs every partition of a pipeline inside this process.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    session: ExecSession,
}

impl LocalExecutor {
    pub fn new(session: ExecSession) -> Self {
        Self { session }
    }

    pub fn from_global() -> Self {
        Self::new(ExecSession::from_global())
    }

    pub fn session(&self) -> &ExecSession {
        &self.session
    }

    pub async fn run(&self, pipeline: &Pipeline) -> Result<ExecutionResult, ExecutionError> {
        let mut protocol = TransactionProtocol::new(pipeline, self.session.clone());

        let input = protocol.negotiate_input()?;
        let filters = protocol.negotiate_filters(&input.schema)?;
        let executor_schema = filters.output_schema(&input.schema).clone();
        let output_task = protocol.negotiate_output(&executor_schema, input.task_count)?;

        let plan = ExecutionPlan {
            input_task: input.task,
            input_schema: input.schema,
            filters,
            output_task,
            executor_schema,
            task_count: input.task_count,
        };
        let task_count = plan.task_count;
        self.execute(protocol, plan, vec![None; task_count], vec![None; task_count])
            .await
    }

    /// Re-runs the partitions of `state` that have not committed, skipping
    /// negotiation, and merges them with the reports committed earlier.
    pub async fn resume(
        &self,
        pipeline: &Pipeline,
        state: &ResumeState,
    ) -> Result<ExecutionResult, ExecutionError> {
        let mut protocol = TransactionProtocol::new(pipeline, self.session.clone());
        let plan = protocol.resume_plan(state)?;
        self.execute(
            protocol,
            plan,
            state.input_reports.clone(),
            state.output_reports.clone(),
        )
        .await
    }

    async fn execute(
        &self,
        mut protocol: TransactionProtocol<'_>,
        plan: ExecutionPlan,
        mut input_reports: Vec<Option<TaskReport>>,
        mut output_reports: Vec<Option<TaskReport>>,
    ) -> Result<ExecutionResult, ExecutionError> {
        let pending: Vec<usize> = (0..plan.task_count)
            .filter(|&i| input_reports[i].is_none() || output_reports[i].is_none())
            .collect();
        let runs = protocol.run_partitions(&plan, &pending).await;

        let mut aborted = Vec::new();
        let mut failures = Vec::new();
        for run in runs {
            let partition = run.partition;
            match run.into_result() {
                Ok((input_report, output_report)) => {
                    input_reports[partition] = Some(input_report);
                    output_reports[partition] = Some(output_report);
                }
                Err((outcome, partition_failures)) => {
                    input_reports[partition] = None;
                    output_reports[partition] = None;
                    aborted.push(outcome);
                    failures.extend(partition_failures);
                }
            }
        }

        let mut outcomes = Vec::with_capacity(plan.task_count);
        let mut committed_inputs = Vec::new();
        let mut committed_outputs = Vec::new();
        let mut aborted = aborted.into_iter().peekable();
        for partition in 0..plan.task_count {
            match (&input_reports[partition], &output_reports[partition]) {
                (Some(input_report), Some(output_report)) => {
                    committed_inputs.push(input_report.clone());
                    committed_outputs.push(output_report.clone());
                    outcomes.push(PartitionOutcome::committed(
                        partition,
                        input_report.clone(),
                        output_report.clone(),
                    ));
                }
                _ => {
                    if let Some(outcome) = aborted.next_if(|o| o.partition == partition) {
                        outcomes.push(outcome);
                    }
                }
            }
        }

        match select_representative(failures) {
            None => {
                let committed = protocol.commit(&plan, &committed_inputs, &committed_outputs);
                let ignored = protocol.cleanup(&plan, &committed_inputs, &committed_outputs);
                let config_diff = committed?;
                Ok(ExecutionResult::new(config_diff, outcomes, ignored))
            }
            Some((cause, suppressed)) => {
                let ignored_errors =
                    protocol.cleanup(&plan, &committed_inputs, &committed_outputs);

                error!(
                    target: LOG_TARGET,
                    partition = cause.partition,
                    side = %cause.side,
                    error = %cause.error,
                    "Run aborted"
                );
                for failure in &suppressed {
                    warn!(
                        target: LOG_TARGET,
                        partition = failure.partition,
                        side = %failure.side,
                        error = %failure.error,
                        "Suppressed partition failure"
                    );
                }
                info!(
                    target: LOG_TARGET,
                    committed = committed_outputs.len(),
                    task_count = plan.task_count,
                    "Partial result kept for resume"
                );

                let resume_state = plan.to_resume_state(input_reports, output_reports);
                Err(ExecutionError::Partial(Box::new(PartialExecution {
                    cause,
                    suppressed,
                    outcomes,
                    resume_state,
                    ignored_errors,
                })))
            }
        }
    }
}
