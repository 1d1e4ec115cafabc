//! Run phase use case
//!
//! [`PhaseOrchestrator`] drives the steps of a [`PhaseDefinition`] strictly in
//! order through the [`StepExecutor`]:
//!
//! ```text
//! validate definition ──► for each step:
//!                           StepExecutor::execute
//!                           ├─ failed   ──► record, abort remaining steps
//!                           └─ success  ──► merge outputs, record
//!                                           └─ review flagged ──► ask human, record decision
//!                         final pass: required outputs ──► completed | incomplete
//! ```
//!
//! Only configuration problems are returned as `Err`; every runtime failure
//! ends up in the returned [`PhaseRunResult`].

use super::gate_pipeline::GatePipeline;
use super::shared::await_decision;
use super::step_executor::StepExecutor;
use crate::agent::AgentPool;
use crate::context::OrchestratorContext;
use crate::ports::event_logger::PhaseEvent;
use crate::ports::human_approval::ApprovalRequest;
use crate::ports::knowledge_store::{handoff_key, step_key};
use crate::ports::progress::{NoProgress, PhaseProgressNotifier};
use relay_domain::{
    FieldMap, PhaseConfigError, PhaseDefinition, PhaseRun, PhaseRunResult, StepDefinition,
    StepDisposition, StepResult,
};
use serde_json::json;
use tracing::{info, warn};

pub struct PhaseOrchestrator {
    agents: AgentPool,
    context: OrchestratorContext,
    executor: StepExecutor,
}

impl PhaseOrchestrator {
    pub fn new(agents: AgentPool, context: OrchestratorContext) -> Self {
        let executor = StepExecutor::new(
            GatePipeline::from_context(&context),
            context.params.confidence_weights,
        );
        Self {
            agents,
            context,
            executor,
        }
    }

    pub fn agents(&self) -> &AgentPool {
        &self.agents
    }

    pub fn context(&self) -> &OrchestratorContext {
        &self.context
    }

    /// Check a definition against the agent pool before running anything.
    ///
    /// Every step must name a known agent whose registry holds the bound
    /// capability.
    pub fn validate(&self, definition: &PhaseDefinition) -> Result<(), PhaseConfigError> {
        definition.validate()?;
        for step in &definition.steps {
            let agent = self
                .agents
                .get(&step.agent)
                .ok_or_else(|| PhaseConfigError::UnknownAgent {
                    step: step.id.to_string(),
                    agent: step.agent.to_string(),
                })?;
            if !agent.registry().contains(&step.capability) {
                return Err(PhaseConfigError::UnknownCapability {
                    step: step.id.to_string(),
                    agent: step.agent.to_string(),
                    capability: step.capability.clone(),
                });
            }
        }
        Ok(())
    }

    pub async fn execute(
        &self,
        definition: &PhaseDefinition,
        seed: FieldMap,
    ) -> Result<PhaseRunResult, PhaseConfigError> {
        self.execute_with_progress(definition, seed, &NoProgress)
            .await
    }

    /// Run only the named steps of `definition`, in the given order.
    pub async fn execute_steps(
        &self,
        definition: &PhaseDefinition,
        step_ids: &[String],
        seed: FieldMap,
        progress: &dyn PhaseProgressNotifier,
    ) -> Result<PhaseRunResult, PhaseConfigError> {
        let selected = definition.select(step_ids)?;
        self.execute_with_progress(&selected, seed, progress).await
    }

    pub async fn execute_with_progress(
        &self,
        definition: &PhaseDefinition,
        seed: FieldMap,
        progress: &dyn PhaseProgressNotifier,
    ) -> Result<PhaseRunResult, PhaseConfigError> {
        self.validate(definition)?;

        let phase = definition.name.as_str();
        info!(phase = phase, steps = definition.steps.len(), "Phase started");
        self.context.events.log(PhaseEvent::new(
            "phase_started",
            json!({
                "phase": phase,
                "steps": definition.step_ids(),
                "seed_fields": seed.keys().collect::<Vec<_>>(),
            }),
        ));
        progress.on_phase_start(phase, definition.steps.len());

        let mut run = PhaseRun::start(phase, seed);

        for (index, step) in definition.steps.iter().enumerate() {
            if self.context.is_cancelled() {
                warn!(phase = phase, step = %step.id, "Phase cancelled");
                run.abort(format!("cancelled before step '{}'", step.id));
                break;
            }

            progress.on_step_start(step, index);
            let result = self
                .executor
                .execute(&self.agents, step, run.output(), &definition.review)
                .await;
            progress.on_step_complete(&result);
            self.log_step(phase, &result);

            let confidence = result.confidence();
            let review = (result.success() && result.human_review_required()).then(|| {
                ApprovalRequest::step_review(
                    step.operation_name(),
                    step.id.clone(),
                    confidence,
                    result.validation_errors().to_vec(),
                    result.output().clone(),
                )
            });
            let produced = result.success().then(|| result.output().clone());

            if run.record_step(result, &step.produces) == StepDisposition::Abort {
                warn!(phase = phase, step = %step.id, "Step failed, aborting phase");
                break;
            }

            if let Some(output) = produced {
                let key = step_key(phase, step.id.as_str());
                if let Err(e) = self.context.knowledge.store(&key, output).await {
                    warn!(key = %key, "Failed to store step output: {}", e);
                }
            }

            if let Some(request) = review {
                let approved = self.resolve_review(step, confidence, &request, progress).await;
                run.record_approval(step.id.clone(), approved);
                self.context.events.log(PhaseEvent::new(
                    "approval_recorded",
                    json!({ "phase": phase, "step": step.id, "approved": approved }),
                ));
            }
        }

        let result = run.finish(&definition.required_outputs, &definition.handoff_fields);

        if !result.handoff.is_empty() {
            let key = handoff_key(phase);
            if let Err(e) = self
                .context
                .knowledge
                .store(&key, result.handoff.clone())
                .await
            {
                warn!(key = %key, "Failed to store hand-off package: {}", e);
            }
        }

        info!(
            phase = phase,
            status = %result.status,
            confidence = result.overall_confidence,
            "Phase finished"
        );
        self.context.events.log(PhaseEvent::new(
            "phase_finished",
            json!({
                "phase": phase,
                "status": result.status,
                "overall_confidence": result.overall_confidence,
                "failed_step": result.failed_step,
                "missing_outputs": result.missing_outputs,
                "errors": result.errors,
            }),
        ));
        progress.on_phase_complete(&result);
        Ok(result)
    }

    /// Ask a human about a flagged step. Anything but an explicit approval
    /// counts as a denial, which is logged and does not stop the phase.
    async fn resolve_review(
        &self,
        step: &StepDefinition,
        confidence: f64,
        request: &ApprovalRequest,
        progress: &dyn PhaseProgressNotifier,
    ) -> bool {
        progress.on_approval_required(step, confidence);

        match await_decision(
            self.context.approval.as_ref(),
            request,
            self.context.params.approval_timeout,
            self.context.cancellation_token(),
        )
        .await
        {
            Ok(decision) if decision.is_approved() => {
                info!(step = %step.id, "Step review approved");
                true
            }
            Ok(decision) => {
                warn!(step = %step.id, reason = decision.reason(), "Step review denied");
                false
            }
            Err(no_decision) => {
                warn!(step = %step.id, "Step review not obtained: {}", no_decision);
                false
            }
        }
    }

    fn log_step(&self, phase: &str, result: &StepResult) {
        self.context.events.log(PhaseEvent::new(
            "step_completed",
            json!({
                "phase": phase,
                "step": result.step(),
                "outcome": result.outcome(),
                "success": result.success(),
                "confidence": result.confidence(),
                "human_review_required": result.human_review_required(),
                "validation_errors": result.validation_errors(),
                "execution_time_ms": result.execution_time().as_millis() as u64,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::ports::event_logger::PhaseEventLogger;
    use crate::ports::human_approval::{
        ApprovalDecision, AutoApproveApproval, AutoRejectApproval, HumanApprovalError,
        HumanApprovalPort,
    };
    use crate::ports::knowledge_store::{KnowledgeStoreError, KnowledgeStorePort};
    use crate::use_cases::gate_pipeline::tests::{Behavior, Stub};
    use async_trait::async_trait;
    use relay_domain::{
        CapabilityRegistry, ErrorKind, PhaseStatus, ReviewPolicy, StepDefinition,
    };
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct MemoryStore(Mutex<BTreeMap<String, FieldMap>>);

    #[async_trait]
    impl KnowledgeStorePort for MemoryStore {
        async fn store(&self, key: &str, value: FieldMap) -> Result<(), KnowledgeStoreError> {
            self.0.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn retrieve(&self, key: &str) -> Result<Option<FieldMap>, KnowledgeStoreError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn keys(&self, prefix: &str) -> Result<Vec<String>, KnowledgeStoreError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingEvents(Mutex<Vec<&'static str>>);

    impl PhaseEventLogger for RecordingEvents {
        fn log(&self, event: PhaseEvent) {
            self.0.lock().unwrap().push(event.event_type);
        }
    }

    struct CountingApproval {
        asked: AtomicUsize,
        approve: bool,
    }

    #[async_trait]
    impl HumanApprovalPort for CountingApproval {
        async fn request_approval(
            &self,
            _request: &ApprovalRequest,
        ) -> Result<ApprovalDecision, HumanApprovalError> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            Ok(if self.approve {
                ApprovalDecision::Approve
            } else {
                ApprovalDecision::Reject(None)
            })
        }
    }

    /// Four-step phase `s1..s4`, each step on its own agent and producing
    /// field `f<n>`, the next one requiring it.
    struct Fixture {
        pool: AgentPool,
        calls: Vec<Arc<AtomicUsize>>,
        definition: PhaseDefinition,
    }

    fn fixture(behaviors: [(Behavior, f64); 4]) -> Fixture {
        let mut pool = AgentPool::new();
        let mut calls = Vec::new();
        let mut definition = PhaseDefinition::new("test");
        const NAMES: [&str; 4] = ["a1", "a2", "a3", "a4"];

        for (i, (behavior, confidence)) in behaviors.into_iter().enumerate() {
            let n = i + 1;
            let stub = Stub::new(NAMES[i], behavior)
                .with_output(&format!("f{n}"), Value::String(format!("value {n}")))
                .with_output("confidence", serde_json::json!(confidence));
            calls.push(stub.calls.clone());
            let mut registry = CapabilityRegistry::new();
            registry.register(stub).unwrap();
            pool.insert(Agent::new(NAMES[i], registry));

            let mut step =
                StepDefinition::new(format!("s{n}"), NAMES[i], NAMES[i], "run").produces([format!("f{n}")]);
            if n > 1 {
                step = step.requires([format!("f{}", n - 1)]);
            }
            definition = definition.with_step(step);
        }
        definition = definition
            .with_required_outputs(["f1", "f2", "f3", "f4"])
            .with_handoff_fields(["f4"])
            .with_review(ReviewPolicy::default().with_default_threshold(0.0));

        Fixture {
            pool,
            calls,
            definition,
        }
    }

    fn context() -> OrchestratorContext {
        OrchestratorContext::new(Arc::new(AutoApproveApproval))
    }

    #[tokio::test]
    async fn test_all_steps_complete() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.8),
            (Behavior::Succeed, 0.7),
            (Behavior::Succeed, 0.6),
        ]);
        let store = Arc::new(MemoryStore::default());
        let orchestrator = PhaseOrchestrator::new(fx.pool, context().with_knowledge_store(store.clone()));

        let result = orchestrator
            .execute(&fx.definition, FieldMap::new())
            .await
            .unwrap();

        assert_eq!(result.status, PhaseStatus::Completed);
        assert_eq!(result.step_results.len(), 4);
        assert!((result.overall_confidence - 0.75).abs() < 1e-9);
        assert_eq!(result.handoff.len(), 1);
        assert_eq!(result.handoff["f4"], "value 4");

        let keys: Vec<&str> = result
            .output
            .validation_results()
            .iter()
            .map(|(s, _)| s.as_str())
            .collect();
        assert_eq!(keys, ["s1", "s2", "s3", "s4"]);

        let stored = store.retrieve("test/handoff").await.unwrap().unwrap();
        assert_eq!(stored["f4"], "value 4");
        assert!(store.retrieve("test/s2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_step_aborts_phase() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Fail, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let orchestrator = PhaseOrchestrator::new(fx.pool, context());

        let result = orchestrator
            .execute(&fx.definition, FieldMap::new())
            .await
            .unwrap();

        assert_eq!(result.status, PhaseStatus::Error);
        assert_eq!(result.failed_step.as_ref().map(|s| s.as_str()), Some("s2"));
        assert!(result.errors[0].contains("disk on fire"));

        let ledger = result.output.validation_results();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get("s1"), Some(true));
        assert_eq!(ledger.get("s2"), Some(false));

        assert!(result.output.has_field("f1"));
        assert!(!result.output.has_field("f2"));
        assert!(result.handoff.is_empty());

        assert_eq!(fx.calls[0].load(Ordering::SeqCst), 1);
        assert_eq!(fx.calls[1].load(Ordering::SeqCst), 1);
        assert_eq!(fx.calls[2].load(Ordering::SeqCst), 0);
        assert_eq!(fx.calls[3].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_overall_confidence_is_mean() {
        let mut fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.6),
            (Behavior::Succeed, 0.3),
            (Behavior::Succeed, 0.0),
        ]);
        fx.definition.steps.truncate(3);
        fx.definition.required_outputs.truncate(3);
        let orchestrator = PhaseOrchestrator::new(fx.pool, context());

        let result = orchestrator
            .execute(&fx.definition, FieldMap::new())
            .await
            .unwrap();

        assert_eq!(result.status, PhaseStatus::Completed);
        let confidences: Vec<f64> = result.step_results.iter().map(|r| r.confidence()).collect();
        assert_eq!(confidences, vec![0.9, 0.6, 0.3]);
        assert_eq!(result.overall_confidence, 0.6);
    }

    #[tokio::test]
    async fn test_missing_required_output_is_incomplete() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let definition = fx
            .definition
            .clone()
            .with_required_outputs(["f1", "f4", "summary"]);
        let orchestrator = PhaseOrchestrator::new(fx.pool, context());

        let result = orchestrator
            .execute(&definition, FieldMap::new())
            .await
            .unwrap();

        assert_eq!(result.status, PhaseStatus::Incomplete);
        assert_eq!(result.missing_outputs, vec!["summary"]);
        assert!(result.failed_step.is_none());
        assert!(result.output.is_finalized());
    }

    #[tokio::test]
    async fn test_review_denial_does_not_abort() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.5),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let definition = fx
            .definition
            .clone()
            .with_review(ReviewPolicy::default().with_always_review("s3"));
        let approval = Arc::new(CountingApproval {
            asked: AtomicUsize::new(0),
            approve: false,
        });
        let orchestrator =
            PhaseOrchestrator::new(fx.pool, OrchestratorContext::new(approval.clone()));

        let result = orchestrator
            .execute(&definition, FieldMap::new())
            .await
            .unwrap();

        assert_eq!(result.status, PhaseStatus::Completed);
        assert_eq!(approval.asked.load(Ordering::SeqCst), 2);
        let approvals = result.output.human_approvals();
        assert_eq!(approvals.len(), 2);
        assert_eq!(approvals.get("s2"), Some(false));
        assert_eq!(approvals.get("s3"), Some(false));
        assert_eq!(result.review_queue().len(), 2);
    }

    #[tokio::test]
    async fn test_events_logged_in_order() {
        let fx = fixture([
            (Behavior::Succeed, 0.5),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let definition = fx.definition.clone().with_review(ReviewPolicy::default());
        let events = Arc::new(RecordingEvents::default());
        let orchestrator = PhaseOrchestrator::new(
            fx.pool,
            OrchestratorContext::new(Arc::new(AutoRejectApproval)).with_event_logger(events.clone()),
        );

        orchestrator
            .execute(&definition, FieldMap::new())
            .await
            .unwrap();

        let logged = events.0.lock().unwrap().clone();
        assert_eq!(
            logged,
            vec![
                "phase_started",
                "step_completed",
                "approval_recorded",
                "step_completed",
                "step_completed",
                "step_completed",
                "phase_finished"
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_phase_returns_result() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Sleep(Duration::from_secs(10)), 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let token = CancellationToken::new();
        let orchestrator =
            PhaseOrchestrator::new(fx.pool, context().with_cancellation(token.clone()));

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            token.cancel();
        });
        let result = orchestrator
            .execute(&fx.definition, FieldMap::new())
            .await
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(result.status, PhaseStatus::Error);
        assert_eq!(result.failed_step.as_ref().map(|s| s.as_str()), Some("s2"));
        assert_eq!(
            result.step_results[1].error_kinds(),
            [ErrorKind::CapabilityExecution]
        );
        assert!(result.output.has_field("f1"));
        assert_eq!(fx.calls[2].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_config_errors_are_returned() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let orchestrator = PhaseOrchestrator::new(fx.pool, context());

        let err = orchestrator
            .execute_steps(
                &fx.definition,
                &["s1".to_string(), "s9".to_string()],
                FieldMap::new(),
                &NoProgress,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseConfigError::UnknownStep { .. }));

        let ghost = fx
            .definition
            .clone()
            .with_step(StepDefinition::new("s5", "ghost", "ghost", "run"));
        let err = orchestrator
            .execute(&ghost, FieldMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseConfigError::UnknownAgent { .. }));

        let wrong_cap = fx
            .definition
            .clone()
            .with_step(StepDefinition::new("s5", "a1", "nope", "run"));
        let err = orchestrator
            .execute(&wrong_cap, FieldMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseConfigError::UnknownCapability { .. }));
    }

    #[tokio::test]
    async fn test_subset_of_steps_with_seed() {
        let fx = fixture([
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
            (Behavior::Succeed, 0.9),
        ]);
        let orchestrator = PhaseOrchestrator::new(fx.pool, context());
        let mut seed = FieldMap::new();
        seed.insert("f2".into(), Value::String("seeded".into()));

        let result = orchestrator
            .execute_steps(&fx.definition, &["s3".to_string()], seed, &NoProgress)
            .await
            .unwrap();

        assert_eq!(result.step_results.len(), 1);
        assert_eq!(result.status, PhaseStatus::Incomplete);
        assert_eq!(fx.calls[0].load(Ordering::SeqCst), 0);
        assert_eq!(fx.calls[2].load(Ordering::SeqCst), 1);
    }
}
