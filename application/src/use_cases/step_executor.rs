//! Step executor use case.
//!
//! Turns one [`StepDefinition`] into a [`StepResult`]:
//!
//! 1. every `requires` field must already be populated in the phase output,
//!    else the step fails with a missing dependency without calling anyone
//! 2. the bound agent receives a request built from the step's static params
//!    plus its `requires` and `accepts` fields
//! 3. the response becomes a result with a confidence score and a review flag
//!
//! A capability reports business failures as an `errors` array in its
//! result; those make the step fail just like an error response.

use super::gate_pipeline::GatePipeline;
use crate::agent::AgentPool;
use futures::FutureExt;
use relay_domain::{
    CapabilityRequest, ConfidenceWeights, ErrorKind, FieldMap, PhaseOutput, ReviewPolicy,
    StepDefinition, StepError, StepResult,
};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result key under which capabilities report business validation errors.
pub const ERRORS_KEY: &str = "errors";

pub struct StepExecutor {
    pipeline: GatePipeline,
    weights: ConfidenceWeights,
}

impl StepExecutor {
    pub fn new(pipeline: GatePipeline, weights: ConfidenceWeights) -> Self {
        Self { pipeline, weights }
    }

    pub fn pipeline(&self) -> &GatePipeline {
        &self.pipeline
    }

    pub async fn execute(
        &self,
        agents: &AgentPool,
        step: &StepDefinition,
        output: &PhaseOutput,
        review: &ReviewPolicy,
    ) -> StepResult {
        let missing = output.missing(&step.requires);
        if !missing.is_empty() {
            let err = StepError::MissingDependency {
                step: step.id.clone(),
                fields: missing,
            };
            warn!(step = %step.id, "{}", err);
            return StepResult::missing_dependency(&err);
        }

        let Some(agent) = agents.get(&step.agent) else {
            return StepResult::failed(
                step.id.clone(),
                vec![(
                    ErrorKind::CapabilityNotFound,
                    format!("No agent '{}' for step '{}'", step.agent, step.id),
                )],
                FieldMap::new(),
                Duration::ZERO,
            );
        };

        let request = build_request(step, output);
        let started = Instant::now();
        let handled = AssertUnwindSafe(agent.handle(&self.pipeline, request))
            .catch_unwind()
            .await;

        let response = match handled {
            Ok(response) => response,
            Err(_) => {
                return StepResult::failed(
                    step.id.clone(),
                    vec![(
                        ErrorKind::CapabilityExecution,
                        format!("Step '{}' panicked outside the capability body", step.id),
                    )],
                    FieldMap::new(),
                    started.elapsed(),
                );
            }
        };

        if let Some(err) = &response.error {
            warn!(step = %step.id, code = err.code(), "Step failed: {}", err);
            return StepResult::failed(
                step.id.clone(),
                vec![(err.kind(), err.to_string())],
                response.result,
                response.execution_time,
            );
        }

        let errors = business_errors(&response.result);
        if !errors.is_empty() {
            warn!(step = %step.id, count = errors.len(), "Step reported validation errors");
            return StepResult::failed(
                step.id.clone(),
                errors
                    .into_iter()
                    .map(|e| (ErrorKind::CapabilityExecution, e))
                    .collect(),
                response.result,
                response.execution_time,
            );
        }

        let confidence = self
            .weights
            .confidence_for(&response.result, &step.produces);
        let review_required = review.requires_review(&step.id, confidence, false);
        info!(
            step = %step.id,
            confidence = confidence,
            review_required = review_required,
            "Step succeeded"
        );
        StepResult::succeeded(
            step.id.clone(),
            response.result,
            confidence,
            review_required,
            response.execution_time,
        )
    }
}

fn build_request(step: &StepDefinition, output: &PhaseOutput) -> CapabilityRequest {
    let mut params = step.params.clone();
    for name in step.requires.iter().chain(step.accepts.iter()) {
        if let Some(value) = output.field(name) {
            params.insert(name.clone(), value.clone());
        }
    }
    let request = CapabilityRequest::new(&step.capability, &step.method).with_params(params);
    match step.timeout {
        Some(timeout) => request.with_timeout(timeout),
        None => request,
    }
}

fn business_errors(result: &FieldMap) -> Vec<String> {
    match result.get(ERRORS_KEY) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::ports::human_approval::AutoRejectApproval;
    use crate::use_cases::gate_pipeline::tests::{Behavior, Stub};
    use relay_domain::{CapabilityRegistry, GatePolicy, StepOutcome};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn executor() -> StepExecutor {
        StepExecutor::new(
            GatePipeline::new(Arc::new(GatePolicy::new()), Arc::new(AutoRejectApproval)),
            ConfidenceWeights::default(),
        )
    }

    fn pool_with(stub: Stub) -> (AgentPool, Arc<AtomicUsize>) {
        let calls = stub.calls.clone();
        let mut registry = CapabilityRegistry::new();
        registry.register(stub).unwrap();
        (AgentPool::new().with_agent(Agent::new("worker", registry)), calls)
    }

    fn step(id: &str) -> StepDefinition {
        StepDefinition::new(id, "worker", "worker", "run")
    }

    fn seed(fields: &[(&str, Value)]) -> PhaseOutput {
        let map: FieldMap = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        PhaseOutput::new("p", map)
    }

    #[tokio::test]
    async fn test_missing_dependency_fails_fast() {
        let (pool, calls) = pool_with(Stub::new("worker", Behavior::Succeed));
        let step = step("architecture_design").requires(["domain_model"]);

        let result = executor()
            .execute(&pool, &step, &seed(&[]), &ReviewPolicy::default())
            .await;

        assert!(!result.success());
        assert_eq!(result.confidence(), 0.0);
        assert!(result.human_review_required());
        assert_eq!(result.error_kinds(), [ErrorKind::MissingDependency]);
        assert!(result.validation_errors()[0].contains("domain_model"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inputs_forwarded_as_params() {
        struct Echo;

        #[async_trait::async_trait]
        impl relay_domain::Capability for Echo {
            fn name(&self) -> &str {
                "worker"
            }
            fn supported_methods(&self) -> Vec<String> {
                vec!["run".into()]
            }
            fn validate_params(&self, _m: &str, _p: &FieldMap) -> Result<(), String> {
                Ok(())
            }
            async fn execute(&self, _m: &str, params: &FieldMap) -> Result<FieldMap, String> {
                let mut out = FieldMap::new();
                out.insert("seen".into(), Value::Object(params.clone()));
                Ok(out)
            }
        }

        let mut registry = CapabilityRegistry::new();
        registry.register(Echo).unwrap();
        let pool = AgentPool::new().with_agent(Agent::new("worker", registry));
        let step = step("s")
            .requires(["requirements"])
            .accepts(["constraints", "absent"])
            .with_param("style", "layered");
        let output = seed(&[
            ("requirements", json!(["r1"])),
            ("constraints", json!("rust")),
            ("unrelated", json!("x")),
        ]);

        let result = executor()
            .execute(&pool, &step, &output, &ReviewPolicy::default())
            .await;

        let seen = result.output()["seen"].as_object().unwrap();
        assert_eq!(seen["requirements"], json!(["r1"]));
        assert_eq!(seen["constraints"], "rust");
        assert_eq!(seen["style"], "layered");
        assert!(!seen.contains_key("unrelated"));
        assert!(!seen.contains_key("absent"));
    }

    #[tokio::test]
    async fn test_success_scores_confidence() {
        let stub = Stub::new("worker", Behavior::Succeed).with_output("architecture", json!({"layers": 3}));
        let (pool, _) = pool_with(stub);
        let step = step("s").produces(["architecture", "diagram"]);

        let result = executor()
            .execute(&pool, &step, &seed(&[]), &ReviewPolicy::default())
            .await;

        assert!(result.success());
        assert_eq!(result.confidence(), 0.5);
        assert!(result.human_review_required());
        assert_eq!(result.outcome(), StepOutcome::NeedsReview);
    }

    #[tokio::test]
    async fn test_reported_confidence_and_always_review() {
        let stub = Stub::new("worker", Behavior::Succeed)
            .with_output("architecture", json!("layered"))
            .with_output("confidence", json!(0.95));
        let (pool, _) = pool_with(stub);
        let step = step("architecture_design").produces(["architecture"]);

        let result = executor()
            .execute(&pool, &step, &seed(&[]), &ReviewPolicy::default())
            .await;
        assert_eq!(result.confidence(), 0.95);
        assert!(!result.human_review_required());

        let review = ReviewPolicy::default().with_always_review("architecture_design");
        let result = executor().execute(&pool, &step, &seed(&[]), &review).await;
        assert!(result.success());
        assert!(result.human_review_required());
    }

    #[tokio::test]
    async fn test_business_errors_fail_step() {
        let stub = Stub::new("worker", Behavior::Succeed)
            .with_output("architecture", json!("layered"))
            .with_output("errors", json!(["no components identified"]));
        let (pool, _) = pool_with(stub);

        let result = executor()
            .execute(&pool, &step("s"), &seed(&[]), &ReviewPolicy::default())
            .await;

        assert!(!result.success());
        assert_eq!(result.validation_errors(), ["no components identified"]);
        assert!(result.human_review_required());
    }

    #[tokio::test]
    async fn test_capability_error_fails_step() {
        let (pool, _) = pool_with(Stub::new("worker", Behavior::Panic));

        let result = executor()
            .execute(&pool, &step("s"), &seed(&[]), &ReviewPolicy::default())
            .await;

        assert!(!result.success());
        assert_eq!(result.error_kinds(), [ErrorKind::CapabilityExecution]);
        assert!(result.validation_errors()[0].contains("stub exploded"));
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let (pool, _) = pool_with(Stub::new("worker", Behavior::Succeed));
        let step = StepDefinition::new("s", "ghost", "worker", "run");

        let result = executor()
            .execute(&pool, &step, &seed(&[]), &ReviewPolicy::default())
            .await;

        assert!(!result.success());
        assert_eq!(result.error_kinds(), [ErrorKind::CapabilityNotFound]);
    }
}
