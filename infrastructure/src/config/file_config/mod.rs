//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types by the `to_*` methods.

mod approval;
mod execution;
mod gates;
mod logging;
mod output;
mod phase;

pub use approval::FileApprovalConfig;
pub use execution::FileExecutionConfig;
pub use gates::{FileApprovalEntry, FileGatesConfig, FilePreconditionEntry};
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use phase::FilePhaseConfig;

use relay_application::ExecutionParams;
use relay_domain::{ApprovalMode, ConfigIssue, GatePolicy, PhaseDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal configuration problems.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration: {}", join_messages(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_messages(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Human approval provider and timeout
    pub approval: FileApprovalConfig,
    /// Extra precondition and approval policy entries
    pub gates: FileGatesConfig,
    /// Overrides for the requirements phase
    pub phase: FilePhaseConfig,
    /// Capability execution limits
    pub execution: FileExecutionConfig,
    /// Phase event log
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checked against the standard requirements phase, which is the phase
    /// the `[phase]` section overrides.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.approval.parse_mode().1);
        issues.extend(self.approval.timeout().1);
        issues.extend(self.execution.capability_timeout().1);
        issues.extend(self.phase.validate(&PhaseDefinition::requirements()));

        issues
    }

    /// Split issues into warnings, failing if any of them is an error.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }

    pub fn approval_mode(&self) -> ApprovalMode {
        self.approval.parse_mode().0
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_approval_timeout(self.approval.timeout().0)
            .with_capability_timeout(self.execution.capability_timeout().0)
    }

    /// The built-in gate policy plus the `[gates]` entries.
    pub fn to_gate_policy(&self) -> GatePolicy {
        self.gates.apply(GatePolicy::standard())
    }

    /// The standard requirements phase with `[phase]` overrides applied.
    pub fn to_phase_definition(&self) -> PhaseDefinition {
        self.phase.apply(PhaseDefinition::requirements())
    }
}
