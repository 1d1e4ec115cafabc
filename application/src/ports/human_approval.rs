//! Human approval port for gated operations and step review.
//!
//! Two places ask a human for a decision:
//!
//! ```text
//! GatePipeline  ── approval gate (policy table) ──┐
//!                                                 ├─► HumanApprovalPort::request_approval()
//! PhaseOrchestrator ── step flagged for review ───┘
//! ```
//!
//! A denial at the approval gate aborts the request. A denial of a step
//! review is recorded and logged but does not abort the phase.
//!
//! # Architecture
//!
//! - **Port**: [`HumanApprovalPort`] - defined here in application layer
//! - **Adapter**: `InteractiveApproval` - implemented in presentation layer
//!
//! # Built-in Implementations
//!
//! - [`AutoRejectApproval`] - Always returns [`ApprovalDecision::Reject`]
//! - [`AutoApproveApproval`] - Always returns [`ApprovalDecision::Approve`]

use async_trait::async_trait;
use relay_domain::{ApprovalMode, FieldMap, StepId};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Why a human is being asked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApprovalReason {
    /// The operation is listed in the approval policy table.
    GatedOperation,
    /// A step result was flagged for human review.
    StepReview {
        step: StepId,
        confidence: f64,
        validation_errors: Vec<String>,
    },
}

/// What the human is asked to approve.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalRequest {
    /// `capability.method`
    pub operation: String,
    pub reason: ApprovalReason,
    /// Request parameters or step output shown to the reviewer
    pub context: FieldMap,
}

impl ApprovalRequest {
    pub fn gated(operation: impl Into<String>, context: FieldMap) -> Self {
        Self {
            operation: operation.into(),
            reason: ApprovalReason::GatedOperation,
            context,
        }
    }

    pub fn step_review(
        operation: impl Into<String>,
        step: StepId,
        confidence: f64,
        validation_errors: Vec<String>,
        context: FieldMap,
    ) -> Self {
        Self {
            operation: operation.into(),
            reason: ApprovalReason::StepReview {
                step,
                confidence,
                validation_errors,
            },
            context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Reject(Option<String>),
}

impl ApprovalDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalDecision::Approve)
    }

    pub fn reason(&self) -> &str {
        match self {
            ApprovalDecision::Approve => "approved",
            ApprovalDecision::Reject(Some(reason)) => reason,
            ApprovalDecision::Reject(None) => "rejected by reviewer",
        }
    }
}

/// Failures while obtaining a decision, as opposed to the decision itself.
///
/// Callers treat every error as a denial.
#[derive(Debug, Clone, Error)]
pub enum HumanApprovalError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Port for obtaining human approval decisions.
#[async_trait]
pub trait HumanApprovalPort: Send + Sync {
    async fn request_approval(
        &self,
        request: &ApprovalRequest,
    ) -> Result<ApprovalDecision, HumanApprovalError>;
}

/// Auto-reject implementation for `ApprovalMode::AutoReject`.
///
/// The safest non-interactive mode.
pub struct AutoRejectApproval;

#[async_trait]
impl HumanApprovalPort for AutoRejectApproval {
    async fn request_approval(
        &self,
        _request: &ApprovalRequest,
    ) -> Result<ApprovalDecision, HumanApprovalError> {
        Ok(ApprovalDecision::Reject(Some("auto-rejected".to_string())))
    }
}

/// Auto-approve implementation for `ApprovalMode::AutoApprove`.
///
/// # Warning
///
/// **Use with caution!** Every gated operation runs and every flagged step
/// is accepted without a human looking at it. Never the default.
pub struct AutoApproveApproval;

#[async_trait]
impl HumanApprovalPort for AutoApproveApproval {
    async fn request_approval(
        &self,
        _request: &ApprovalRequest,
    ) -> Result<ApprovalDecision, HumanApprovalError> {
        Ok(ApprovalDecision::Approve)
    }
}

/// Pick an approval provider for a mode. `interactive` is supplied by the
/// caller because it lives in an outer layer; without one the mode falls
/// back to auto-reject.
pub fn approval_for_mode(
    mode: ApprovalMode,
    interactive: Option<Arc<dyn HumanApprovalPort>>,
) -> Arc<dyn HumanApprovalPort> {
    match mode {
        ApprovalMode::AutoApprove => {
            tracing::warn!("Approval mode is auto_approve - every approval will be granted");
            Arc::new(AutoApproveApproval)
        }
        ApprovalMode::AutoReject => Arc::new(AutoRejectApproval),
        ApprovalMode::Interactive => match interactive {
            Some(port) => port,
            None => {
                tracing::warn!("No interactive approval handler configured, auto-rejecting");
                Arc::new(AutoRejectApproval)
            }
        },
    }
}
