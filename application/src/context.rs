//! Per-run orchestration context.
//!
//! [`OrchestratorContext`] replaces process-wide state: everything a phase
//! run needs from the outside (policy tables, approval provider, knowledge
//! store, event log, limits, cancellation) is passed in explicitly. One
//! context is built per run and dropped with it.

use crate::config::ExecutionParams;
use crate::ports::event_logger::{NoPhaseEventLogger, PhaseEventLogger};
use crate::ports::human_approval::{AutoRejectApproval, HumanApprovalPort};
use crate::ports::knowledge_store::{KnowledgeStorePort, NoKnowledgeStore};
use relay_domain::GatePolicy;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct OrchestratorContext {
    pub policy: Arc<GatePolicy>,
    pub params: ExecutionParams,
    pub approval: Arc<dyn HumanApprovalPort>,
    pub knowledge: Arc<dyn KnowledgeStorePort>,
    pub events: Arc<dyn PhaseEventLogger>,
    cancellation_token: CancellationToken,
}

impl Default for OrchestratorContext {
    fn default() -> Self {
        Self::new(Arc::new(AutoRejectApproval))
    }
}

impl OrchestratorContext {
    /// Context with an empty gate policy, default limits and no-op adapters.
    pub fn new(approval: Arc<dyn HumanApprovalPort>) -> Self {
        Self {
            policy: Arc::new(GatePolicy::new()),
            params: ExecutionParams::default(),
            approval,
            knowledge: Arc::new(NoKnowledgeStore),
            events: Arc::new(NoPhaseEventLogger),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: GatePolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_knowledge_store(mut self, store: Arc<dyn KnowledgeStorePort>) -> Self {
        self.knowledge = store;
        self
    }

    pub fn with_event_logger(mut self, events: Arc<dyn PhaseEventLogger>) -> Self {
        self.events = events;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

impl std::fmt::Debug for OrchestratorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorContext")
            .field("policy", &self.policy)
            .field("params", &self.params)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
