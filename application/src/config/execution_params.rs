//! Execution parameters: gate pipeline and step executor control.
//!
//! [`ExecutionParams`] groups the static parameters that bound how long the
//! pipeline may wait and how step confidence is scored. These are
//! application-layer concerns, not domain policy.

use relay_domain::ConfidenceWeights;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait for a human approval decision.
pub const DEFAULT_APPROVAL_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// How long the approval gate waits before treating silence as denial.
    pub approval_timeout: Duration,
    /// Upper bound on a capability body when the request sets none.
    pub capability_timeout: Option<Duration>,
    pub confidence_weights: ConfidenceWeights,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            approval_timeout: DEFAULT_APPROVAL_TIMEOUT,
            capability_timeout: None,
            confidence_weights: ConfidenceWeights::default(),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_approval_timeout(mut self, timeout: Duration) -> Self {
        self.approval_timeout = timeout;
        self
    }

    pub fn with_capability_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.capability_timeout = timeout;
        self
    }

    pub fn with_confidence_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.confidence_weights = weights;
        self
    }
}
