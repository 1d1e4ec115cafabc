//! Gate identifiers and outcomes.
//!
//! The pipeline runs the gates in the order given by [`GateKind::ORDER`].
//! Each gate reports a [`GateOutcome`] instead of raising, so the
//! short-circuit logic is a plain `match` in the application layer.

use super::error::CapabilityError;
use serde::{Deserialize, Serialize};

/// One mandatory check in the capability execution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Existence,
    Timestamp,
    Precondition,
    HumanApproval,
    Parameter,
    Execution,
    Completion,
}

impl GateKind {
    /// Fixed evaluation order.
    pub const ORDER: [GateKind; 7] = [
        GateKind::Existence,
        GateKind::Timestamp,
        GateKind::Precondition,
        GateKind::HumanApproval,
        GateKind::Parameter,
        GateKind::Execution,
        GateKind::Completion,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            GateKind::Existence => "existence",
            GateKind::Timestamp => "timestamp",
            GateKind::Precondition => "precondition",
            GateKind::HumanApproval => "human_approval",
            GateKind::Parameter => "parameter",
            GateKind::Execution => "execution",
            GateKind::Completion => "completion",
        }
    }

    /// Position of this gate in [`GateKind::ORDER`].
    pub fn position(&self) -> usize {
        Self::ORDER.iter().position(|g| g == self).unwrap_or(usize::MAX)
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a single gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// The gate's check ran and passed.
    Passed,
    /// The policy tables do not flag this request for the gate.
    NotRequired,
    /// The gate rejected the request; the pipeline stops here.
    Denied(CapabilityError),
}

impl GateOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, GateOutcome::Denied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_positions() {
        assert_eq!(GateKind::Existence.position(), 0);
        assert!(GateKind::Timestamp.position() < GateKind::Precondition.position());
        assert!(GateKind::Precondition.position() < GateKind::HumanApproval.position());
        assert!(GateKind::HumanApproval.position() < GateKind::Parameter.position());
        assert_eq!(GateKind::Completion.position(), 6);
    }

    #[test]
    fn test_outcome_denied() {
        assert!(!GateOutcome::Passed.is_denied());
        assert!(!GateOutcome::NotRequired.is_denied());
        assert!(GateOutcome::Denied(CapabilityError::not_found("x")).is_denied());
    }
}
