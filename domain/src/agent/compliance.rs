//! Per-agent compliance flags set by the gate pipeline.

use serde::{Deserialize, Serialize};

/// Record of which mandatory gate side effects an agent has satisfied.
///
/// Flags are sticky for the lifetime of the agent: once a completion has been
/// recorded it stays recorded. Counters track how often each happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFlags {
    pub timestamp_recorded: bool,
    pub completion_recorded: bool,
    pub invocations: u64,
    pub completions: u64,
}

impl ComplianceFlags {
    pub fn record_timestamp(&mut self) {
        self.timestamp_recorded = true;
        self.invocations += 1;
    }

    pub fn record_completion(&mut self) {
        self.completion_recorded = true;
        self.completions += 1;
    }

    /// Every timestamped invocation also reached the completion gate.
    pub fn is_fully_compliant(&self) -> bool {
        self.timestamp_recorded && self.completion_recorded && self.invocations == self.completions
    }
}
