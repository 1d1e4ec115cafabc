//! Error taxonomy shared by every layer.
//!
//! Each concrete error enum (`CapabilityError`, `TddError`, `StepError`) maps
//! onto one [`ErrorKind`]. The kind is what callers branch on and what gets
//! serialized into responses and phase results; the message is for humans.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of failure recognised by the orchestration core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CapabilityNotFound,
    DuplicateCapability,
    IncompatibleCapability,
    PreconditionValidation,
    HumanApprovalDenied,
    InvalidParameter,
    CapabilityExecution,
    /// Capability body exceeded the request timeout.
    Timeout,
    MissingDependency,
    InvalidCycleTransition,
    CoverageThreshold,
    MutationScoreThreshold,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::CapabilityNotFound => "NOT_FOUND",
            ErrorKind::DuplicateCapability => "DUPLICATE",
            ErrorKind::IncompatibleCapability => "INCOMPATIBLE",
            ErrorKind::PreconditionValidation => "PRECONDITION_FAILED",
            ErrorKind::HumanApprovalDenied => "APPROVAL_DENIED",
            ErrorKind::InvalidParameter => "INVALID_ARGUMENT",
            ErrorKind::CapabilityExecution => "EXECUTION_FAILED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::MissingDependency => "MISSING_DEPENDENCY",
            ErrorKind::InvalidCycleTransition => "INVALID_TRANSITION",
            ErrorKind::CoverageThreshold => "COVERAGE_BELOW_THRESHOLD",
            ErrorKind::MutationScoreThreshold => "MUTATION_SCORE_BELOW_THRESHOLD",
        }
    }

    /// Whether this kind is raised by one of the pre-execution gates.
    pub fn is_gate_rejection(&self) -> bool {
        matches!(
            self,
            ErrorKind::CapabilityNotFound
                | ErrorKind::PreconditionValidation
                | ErrorKind::HumanApprovalDenied
                | ErrorKind::InvalidParameter
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
