//! A running agent: one capability registry plus mutable bookkeeping.

use crate::use_cases::gate_pipeline::GatePipeline;
use relay_domain::{
    AgentId, AgentStatus, AgentTask, CapabilityRegistry, CapabilityRequest, CapabilityResponse,
    ComplianceFlags, ErrorKind,
};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::debug;

/// Finished tasks kept per agent unless overridden with
/// [`Agent::with_history_limit`].
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Mutable part of an agent, guarded as one unit.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    pub status: AgentStatus,
    pub compliance: ComplianceFlags,
    /// Most recent finished tasks, oldest first
    pub history: VecDeque<AgentTask>,
}

/// An agent owning exactly one [`CapabilityRegistry`].
///
/// Requests to the same agent are serialised by a turn lock held for the
/// whole request, so a capability holding its own state (such as the TDD
/// coach) never sees two requests at once. The state lock is only taken for
/// bookkeeping, so `status()` reports `Working` while a request is in flight.
/// Different agents share nothing and run independently.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    registry: CapabilityRegistry,
    turn: Mutex<()>,
    state: Mutex<AgentState>,
    history_limit: usize,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, registry: CapabilityRegistry) -> Self {
        Self {
            id: id.into(),
            registry,
            turn: Mutex::new(()),
            state: Mutex::new(AgentState::default()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep at most `limit` finished tasks; older ones are dropped first.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub async fn status(&self) -> AgentStatus {
        self.state.lock().await.status
    }

    pub async fn compliance(&self) -> ComplianceFlags {
        self.state.lock().await.compliance.clone()
    }

    pub async fn snapshot(&self) -> AgentState {
        self.state.lock().await.clone()
    }

    /// Run `request` through `pipeline` as a tracked task.
    ///
    /// Status moves IDLE → WORKING → COMPLETED | ERROR | WAITING_HUMAN and
    /// drops back to IDLE at the start of the next request.
    pub async fn handle(
        &self,
        pipeline: &GatePipeline,
        request: CapabilityRequest,
    ) -> CapabilityResponse {
        let _turn = self.turn.lock().await;

        let mut task = AgentTask::new(
            request.operation_name(),
            self.id.clone(),
            request.params.clone(),
        );
        task.mark_working();
        debug!(agent = %self.id, task = %task.id, operation = %task.name, "Task started");

        // Only this turn writes compliance, so a copy can be worked on
        // without holding the state lock across the pipeline.
        let mut compliance = {
            let mut state = self.state.lock().await;
            if state.status.is_terminal() {
                state.status = AgentStatus::Idle;
            }
            state.status = AgentStatus::Working;
            state.compliance.clone()
        };

        let response = pipeline.run(&self.registry, &mut compliance, &request).await;

        match (&response.error, response.error_kind()) {
            (None, _) => task.mark_completed(response.result.clone()),
            (Some(err), Some(ErrorKind::HumanApprovalDenied)) => {
                task.mark_waiting_human(err.to_string())
            }
            (Some(err), _) => task.mark_error(err.to_string()),
        }
        if let Some(approved) = response.metadata.human_approved {
            task.requires_human_approval = true;
            task.human_approved = Some(approved);
        }
        debug!(agent = %self.id, task = %task.id, status = %task.status, "Task finished");

        let mut state = self.state.lock().await;
        state.compliance = compliance;
        state.status = task.status;
        state.history.push_back(task);
        while state.history.len() > self.history_limit {
            state.history.pop_front();
        }
        response
    }
}
