//! Shared utilities for use cases.
//!
//! Contains the bounded, cancellable wait for a human approval decision used
//! by both the approval gate and step review.

use crate::ports::human_approval::{ApprovalDecision, ApprovalRequest, HumanApprovalPort};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Why no decision was obtained. Every variant counts as a denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NoDecision {
    TimedOut(Duration),
    Cancelled,
    ProviderFailed(String),
}

impl std::fmt::Display for NoDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoDecision::TimedOut(after) => {
                write!(f, "no approval decision within {}s", after.as_secs_f64())
            }
            NoDecision::Cancelled => write!(f, "cancelled while waiting for approval"),
            NoDecision::ProviderFailed(e) => write!(f, "approval provider failed: {}", e),
        }
    }
}

/// Ask `port` for a decision, giving up after `timeout` or on cancellation.
pub(crate) async fn await_decision(
    port: &dyn HumanApprovalPort,
    request: &ApprovalRequest,
    timeout: Duration,
    cancellation_token: &CancellationToken,
) -> Result<ApprovalDecision, NoDecision> {
    tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => Err(NoDecision::Cancelled),
        outcome = tokio::time::timeout(timeout, port.request_approval(request)) => match outcome {
            Err(_) => Err(NoDecision::TimedOut(timeout)),
            Ok(Err(e)) => Err(NoDecision::ProviderFailed(e.to_string())),
            Ok(Ok(decision)) => Ok(decision),
        },
    }
}
