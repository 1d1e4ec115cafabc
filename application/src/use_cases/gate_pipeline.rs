//! Gate pipeline use case.
//!
//! Runs one [`CapabilityRequest`] through the seven gates in order and
//! always returns a [`CapabilityResponse`]. Gate failures, capability
//! errors, panics, timeouts and cancellation all become error responses;
//! nothing escapes as a panic or an `Err`.
//!
//! Gates 1 to 5 have no side effects beyond logging and the timestamp
//! bookkeeping, so the capability body runs at most once per request.

use crate::context::OrchestratorContext;
use crate::ports::human_approval::{ApprovalRequest, HumanApprovalPort};
use crate::use_cases::shared::{NoDecision, await_decision};
use chrono::Utc;
use futures::FutureExt;
use relay_domain::{
    Capability, CapabilityError, CapabilityRegistry, CapabilityRequest, CapabilityResponse,
    ComplianceFlags, FieldMap, GateKind, GateOutcome, GatePolicy, RegisteredCapability,
    ResponseMetadata,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct GatePipeline {
    policy: Arc<GatePolicy>,
    approval: Arc<dyn HumanApprovalPort>,
    approval_timeout: Duration,
    default_timeout: Option<Duration>,
    cancellation_token: CancellationToken,
}

impl GatePipeline {
    pub fn new(policy: Arc<GatePolicy>, approval: Arc<dyn HumanApprovalPort>) -> Self {
        Self {
            policy,
            approval,
            approval_timeout: crate::config::DEFAULT_APPROVAL_TIMEOUT,
            default_timeout: None,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn from_context(context: &OrchestratorContext) -> Self {
        Self {
            policy: context.policy.clone(),
            approval: context.approval.clone(),
            approval_timeout: context.params.approval_timeout,
            default_timeout: context.params.capability_timeout,
            cancellation_token: context.cancellation_token().clone(),
        }
    }

    pub fn with_approval_timeout(mut self, timeout: Duration) -> Self {
        self.approval_timeout = timeout;
        self
    }

    /// Bound capability bodies whose request carries no timeout.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Run every gate for `request` against `registry`.
    ///
    /// `compliance` belongs to the agent that owns the registry; the timestamp
    /// and completion gates record into it.
    pub async fn run(
        &self,
        registry: &CapabilityRegistry,
        compliance: &mut ComplianceFlags,
        request: &CapabilityRequest,
    ) -> CapabilityResponse {
        let mut metadata = ResponseMetadata::default();

        // 1. Existence
        let Some(entry) = registry.get(&request.capability) else {
            warn!(
                capability = %request.capability,
                method = %request.method,
                request_id = %request.request_id,
                "Capability not found"
            );
            metadata.failed_gate = Some(GateKind::Existence);
            return CapabilityResponse::failure(
                request.request_id.clone(),
                CapabilityError::not_found(&request.capability),
                metadata,
                Duration::ZERO,
            );
        };
        metadata.pass(GateKind::Existence);

        // 2. Timestamp
        let started = Instant::now();
        metadata.start_utc = Some(Utc::now());
        compliance.record_timestamp();
        metadata.pass(GateKind::Timestamp);
        debug!(request_id = %request.request_id, operation = %request.operation_name(), "Request timestamped");

        // 3. Precondition
        let outcome = self.check_precondition(request);
        if let Err(response) = settle(GateKind::Precondition, outcome, &mut metadata, request, started) {
            return response;
        }

        // 4. Human approval
        let (outcome, approved) = self.check_approval(request).await;
        metadata.human_approved = approved;
        if let Err(response) = settle(GateKind::HumanApproval, outcome, &mut metadata, request, started) {
            return response;
        }

        // 5. Parameters
        let outcome = check_parameters(entry, request);
        if let Err(response) = settle(GateKind::Parameter, outcome, &mut metadata, request, started) {
            return response;
        }

        // 6. Execution
        let result = match self.execute(entry.capability(), request).await {
            Ok(result) => result,
            Err(err) => return reject(GateKind::Execution, err, metadata, request, started),
        };
        metadata.pass(GateKind::Execution);

        // 7. Completion
        let elapsed = started.elapsed();
        metadata.finish(elapsed);
        compliance.record_completion();
        metadata.completion_recorded = true;
        metadata.pass(GateKind::Completion);

        info!(
            request_id = %request.request_id,
            capability = %request.capability,
            method = %request.method,
            duration_ms = elapsed.as_millis() as u64,
            "Capability completed"
        );
        CapabilityResponse::success(request.request_id.clone(), result, metadata, elapsed)
    }

    fn check_precondition(&self, request: &CapabilityRequest) -> GateOutcome {
        match self
            .policy
            .precondition_for(&request.capability, &request.method)
        {
            None => GateOutcome::NotRequired,
            Some(precondition) => match precondition.check(&request.params) {
                Ok(()) => GateOutcome::Passed,
                Err(reason) => GateOutcome::Denied(CapabilityError::PreconditionValidation {
                    operation: request.operation_name(),
                    reason,
                }),
            },
        }
    }

    /// Returns the gate outcome and, when a human was asked, the decision.
    async fn check_approval(&self, request: &CapabilityRequest) -> (GateOutcome, Option<bool>) {
        if !self
            .policy
            .requires_approval(&request.capability, &request.method)
        {
            return (GateOutcome::NotRequired, None);
        }

        let operation = request.operation_name();
        let approval_request = ApprovalRequest::gated(&operation, request.params.clone());
        info!(request_id = %request.request_id, operation = %operation, "Waiting for human approval");

        match await_decision(
            self.approval.as_ref(),
            &approval_request,
            self.approval_timeout,
            &self.cancellation_token,
        )
        .await
        {
            Ok(decision) if decision.is_approved() => (GateOutcome::Passed, Some(true)),
            Ok(decision) => (
                GateOutcome::Denied(CapabilityError::HumanApprovalDenied {
                    operation,
                    reason: decision.reason().to_string(),
                }),
                Some(false),
            ),
            Err(NoDecision::Cancelled) => {
                warn!(request_id = %request.request_id, "Cancelled while waiting for approval");
                (
                    GateOutcome::Denied(CapabilityError::execution(&operation, "cancelled")),
                    None,
                )
            }
            Err(no_decision) => {
                warn!(request_id = %request.request_id, "Approval not obtained: {}", no_decision);
                (
                    GateOutcome::Denied(CapabilityError::HumanApprovalDenied {
                        operation,
                        reason: no_decision.to_string(),
                    }),
                    Some(false),
                )
            }
        }
    }

    /// Run the capability body under the request timeout and the
    /// cancellation token, converting panics into execution errors.
    async fn execute(
        &self,
        capability: &Arc<dyn Capability>,
        request: &CapabilityRequest,
    ) -> Result<FieldMap, CapabilityError> {
        let operation = request.operation_name();
        let body = AssertUnwindSafe(capability.execute(&request.method, &request.params)).catch_unwind();
        let limit = request.timeout.or(self.default_timeout);

        let bounded = async {
            match limit {
                Some(limit) => tokio::time::timeout(limit, body).await.map_err(|_| {
                    CapabilityError::Timeout {
                        operation: operation.clone(),
                        after_ms: limit.as_millis() as u64,
                    }
                }),
                None => Ok(body.await),
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => {
                return Err(CapabilityError::execution(&operation, "cancelled"));
            }
            outcome = bounded => outcome?,
        };

        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(message)) => Err(CapabilityError::execution(&operation, message)),
            Err(payload) => Err(CapabilityError::execution(
                &operation,
                format!("capability panicked: {}", panic_message(payload.as_ref())),
            )),
        }
    }
}

fn check_parameters(entry: &RegisteredCapability, request: &CapabilityRequest) -> GateOutcome {
    if !entry.supports(&request.method) {
        return GateOutcome::Denied(CapabilityError::InvalidParameter {
            operation: request.operation_name(),
            reason: format!(
                "unsupported method '{}' (supported: {})",
                request.method,
                entry.methods().join(", ")
            ),
        });
    }

    let validated = std::panic::catch_unwind(AssertUnwindSafe(|| {
        entry
            .capability()
            .validate_params(&request.method, &request.params)
    }));
    match validated {
        Ok(Ok(())) => GateOutcome::Passed,
        Ok(Err(reason)) => GateOutcome::Denied(CapabilityError::InvalidParameter {
            operation: request.operation_name(),
            reason,
        }),
        Err(payload) => GateOutcome::Denied(CapabilityError::InvalidParameter {
            operation: request.operation_name(),
            reason: format!("parameter validation panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

/// Apply a gate outcome: record a pass, or turn a denial into a response.
fn settle(
    gate: GateKind,
    outcome: GateOutcome,
    metadata: &mut ResponseMetadata,
    request: &CapabilityRequest,
    started: Instant,
) -> Result<(), CapabilityResponse> {
    match outcome {
        GateOutcome::Passed => {
            metadata.pass(gate);
            Ok(())
        }
        GateOutcome::NotRequired => Ok(()),
        GateOutcome::Denied(err) => Err(reject(
            gate,
            err,
            std::mem::take(metadata),
            request,
            started,
        )),
    }
}

fn reject(
    gate: GateKind,
    error: CapabilityError,
    mut metadata: ResponseMetadata,
    request: &CapabilityRequest,
    started: Instant,
) -> CapabilityResponse {
    let elapsed = started.elapsed();
    metadata.failed_gate = Some(gate);
    metadata.finish(elapsed);
    warn!(
        request_id = %request.request_id,
        gate = %gate,
        code = error.code(),
        "Request rejected: {}",
        error
    );
    CapabilityResponse::failure(request.request_id.clone(), error, metadata, elapsed)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
