use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the transaction protocol currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStage {
    InputBegin,
    FilterBegin,
    OutputBegin,
    Run,
    OutputEnd,
    FilterEnd,
    InputEnd,
    Cleanup,
}

impl TransactionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStage::InputBegin => "input_begin",
            TransactionStage::FilterBegin => "filter_begin",
            TransactionStage::OutputBegin => "output_begin",
            TransactionStage::Run => "run",
            TransactionStage::OutputEnd => "output_end",
            TransactionStage::FilterEnd => "filter_end",
            TransactionStage::InputEnd => "input_end",
            TransactionStage::Cleanup => "cleanup",
        }
    }

    /// Stages before any partition started.
    pub fn is_negotiation(self) -> bool {
        matches!(
            self,
            TransactionStage::InputBegin | TransactionStage::FilterBegin | TransactionStage::OutputBegin
        )
    }
}

impl fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
