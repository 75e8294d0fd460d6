use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::{self, JoinError};
use tracing::debug;

use crate::engine::page::{Page, PageOutput};
use crate::engine::plugin::{InputPlugin, OutputPlugin, PluginError, TransactionalPageOutput};
use crate::shared::config::TaskReport;

use super::errors::representative_index;
use super::{
    ChannelPageOutput, ExecSession, ExecutionPlan, PageChannel, PageChannelReceiver,
    PartitionFailure, PartitionOutcome, PartitionSide,
};

const LOG_TARGET: &str = "engine::exec::worker";

/// Shared, read-only state of every partition of one run.
pub(super) struct PartitionContext {
    pub session: ExecSession,
    pub input: Arc<dyn InputPlugin>,
    pub output: Arc<dyn OutputPlugin>,
    pub plan: ExecutionPlan,
}

/// What both sides of one partition returned.
#[derive(Debug)]
pub struct PartitionRun {
    pub partition: usize,
    pub input: Result<TaskReport, PluginError>,
    pub output: Result<TaskReport, PluginError>,
}

impl PartitionRun {
    pub fn is_committed(&self) -> bool {
        self.input.is_ok() && self.output.is_ok()
    }

    /// Both reports, or the failures ordered input before output together
    /// with the aborted outcome naming the partition's representative one.
    pub(super) fn into_result(
        self,
    ) -> Result<(TaskReport, TaskReport), (PartitionOutcome, Vec<PartitionFailure>)> {
        let partition = self.partition;
        let (input_error, output_error) = match (self.input, self.output) {
            (Ok(input), Ok(output)) => return Ok((input, output)),
            (input, output) => (input.err(), output.err()),
        };

        let failures: Vec<PartitionFailure> = [
            input_error.map(|e| PartitionFailure::new(partition, PartitionSide::Input, e)),
            output_error.map(|e| PartitionFailure::new(partition, PartitionSide::Output, e)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let outcome = match representative_index(&failures) {
            Some(index) => {
                let failure = &failures[index];
                PartitionOutcome::aborted(partition, failure.side, failure.error.to_string())
            }
            None => PartitionOutcome::aborted(partition, PartitionSide::Input, "unknown failure"),
        };
        Err((outcome, failures))
    }
}

/// Runs one partition: the input side feeds the filter chain and a bounded
/// channel from one blocking task, the output side drains it from another.
pub(super) async fn run_partition(context: Arc<PartitionContext>, partition: usize) -> PartitionRun {
    let (sender, receiver) = PageChannel::bounded(context.session.channel_capacity());

    let producer_context = Arc::clone(&context);
    let producer = task::spawn_blocking(move || produce(&producer_context, partition, sender));
    let consumer_context = Arc::clone(&context);
    let consumer = task::spawn_blocking(move || consume(&consumer_context, partition, receiver));

    let (input, output) = tokio::join!(producer, consumer);
    PartitionRun {
        partition,
        input: joined(input, PartitionSide::Input),
        output: joined(output, PartitionSide::Output),
    }
}

fn joined(
    result: Result<Result<TaskReport, PluginError>, JoinError>,
    side: PartitionSide,
) -> Result<TaskReport, PluginError> {
    result.unwrap_or_else(|err| Err(PluginError::Other(anyhow!("{side} task did not complete: {err}"))))
}

fn produce(
    context: &PartitionContext,
    partition: usize,
    sender: ChannelPageOutput,
) -> Result<TaskReport, PluginError> {
    let plan = &context.plan;
    let mut sink = plan.filters.open(&context.session, Box::new(sender))?;

    let mut side = InputSide {
        inner: sink.as_mut(),
    };
    let result = context.input.run(
        &context.session,
        &plan.input_task,
        &plan.input_schema,
        partition,
        &mut side,
    );
    let result = result.and_then(|report| {
        sink.finish()?;
        Ok(report)
    });
    sink.close();

    debug!(
        target: LOG_TARGET,
        partition,
        ok = result.is_ok(),
        "Input side finished"
    );
    result
}

/// What the input plugin writes to. The executor alone ends the stream.
struct InputSide<'a> {
    inner: &'a mut dyn PageOutput,
}

impl PageOutput for InputSide<'_> {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        self.inner.add(page)
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    fn close(&mut self) {}
}

fn consume(
    context: &PartitionContext,
    partition: usize,
    mut receiver: PageChannelReceiver,
) -> Result<TaskReport, PluginError> {
    let plan = &context.plan;
    let mut writer = match context.output.open(
        &context.session,
        &plan.output_task,
        &plan.executor_schema,
        partition,
    ) {
        Ok(writer) => writer,
        Err(err) => {
            receiver.close();
            return Err(err);
        }
    };

    let result = drain(&mut receiver, writer.as_mut()).and_then(|()| writer.commit());
    if result.is_err() {
        receiver.close();
        writer.abort();
    }
    writer.close();

    debug!(
        target: LOG_TARGET,
        partition,
        pages = receiver.pages_received(),
        ok = result.is_ok(),
        "Output side finished"
    );
    result
}

fn drain(
    receiver: &mut PageChannelReceiver,
    writer: &mut dyn TransactionalPageOutput,
) -> Result<(), PluginError> {
    while let Some(page) = receiver.recv()? {
        writer.add(page)?;
    }
    writer.finish()
}
