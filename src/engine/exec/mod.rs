//! Transactional execution: negotiation, per-partition workers, commit and cleanup.

mod channel;
mod errors;
mod local;
mod pipeline;
mod protocol;
mod result;
mod resume;
mod session;
mod stage;
mod worker;

#[cfg(test)]
mod pipeline_test;

pub use channel::{ChannelPageOutput, PageChannel, PageChannelReceiver, PageFrame};
pub use errors::{ExecutionError, PartialExecution, PartitionFailure, PartitionSide};
pub use local::LocalExecutor;
pub use pipeline::Pipeline;
pub use protocol::{ExecutionPlan, TransactionProtocol};
pub use result::{ExecutionResult, PartitionOutcome, PartitionState};
pub use resume::ResumeState;
pub use session::ExecSession;
pub use stage::TransactionStage;
pub use worker::PartitionRun;
