//! Agent task entity.
//!
//! An [`AgentTask`] records one capability invocation performed by an agent.
//! The owning agent moves it through
//! `Idle → Working → {Completed | Error | WaitingHuman}` and appends it to its
//! history once terminal.

use super::value_objects::{AgentId, TaskId};
use crate::capability::value_objects::FieldMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an agent (and of the task it is currently working on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Working,
    Completed,
    Error,
    WaitingHuman,
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Working => "working",
            AgentStatus::Completed => "completed",
            AgentStatus::Error => "error",
            AgentStatus::WaitingHuman => "waiting_human",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentStatus::Completed | AgentStatus::Error | AgentStatus::WaitingHuman
        )
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// A unit of work performed by one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: TaskId,
    /// Usually `<capability>.<method>`
    pub name: String,
    pub agent_id: AgentId,
    pub input_data: FieldMap,
    pub output_data: FieldMap,
    pub status: AgentStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether the gate pipeline asked a human before executing
    pub requires_human_approval: bool,
    /// Outcome of the approval request, if one was made
    pub human_approved: Option<bool>,
    pub error: Option<String>,
}

impl AgentTask {
    pub fn new(name: impl Into<String>, agent_id: impl Into<AgentId>, input: FieldMap) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            agent_id: agent_id.into(),
            input_data: input,
            output_data: FieldMap::new(),
            status: AgentStatus::Idle,
            priority: TaskPriority::default(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            requires_human_approval: false,
            human_approved: None,
            error: None,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn mark_working(&mut self) {
        self.status = AgentStatus::Working;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, output: FieldMap) {
        self.status = AgentStatus::Completed;
        self.output_data = output;
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_error(&mut self, error: impl Into<String>) {
        self.status = AgentStatus::Error;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }

    /// The task stopped because a human declined (or never answered).
    pub fn mark_waiting_human(&mut self, reason: impl Into<String>) {
        self.status = AgentStatus::WaitingHuman;
        self.requires_human_approval = true;
        self.human_approved = Some(false);
        self.error = Some(reason.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
