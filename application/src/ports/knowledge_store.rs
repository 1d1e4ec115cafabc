//! Knowledge store port.
//!
//! The only channel between agents and phases. Keys are `/`-separated paths
//! such as `requirements/domain_modeling` or `requirements/handoff`.
//! Implementations must make a write visible to every later read in the same
//! process; nothing stronger is required.

use async_trait::async_trait;
use relay_domain::FieldMap;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum KnowledgeStoreError {
    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait KnowledgeStorePort: Send + Sync {
    async fn store(&self, key: &str, value: FieldMap) -> Result<(), KnowledgeStoreError>;

    async fn retrieve(&self, key: &str) -> Result<Option<FieldMap>, KnowledgeStoreError>;

    /// Keys under `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, KnowledgeStoreError>;
}

/// Key under which a step's merged output is stored.
pub fn step_key(phase: &str, step: &str) -> String {
    format!("{}/{}", phase, step)
}

/// Key under which a phase's hand-off package is stored.
pub fn handoff_key(phase: &str) -> String {
    format!("{}/handoff", phase)
}

/// Discards writes; reads find nothing.
pub struct NoKnowledgeStore;

#[async_trait]
impl KnowledgeStorePort for NoKnowledgeStore {
    async fn store(&self, _key: &str, _value: FieldMap) -> Result<(), KnowledgeStoreError> {
        Ok(())
    }

    async fn retrieve(&self, _key: &str) -> Result<Option<FieldMap>, KnowledgeStoreError> {
        Ok(None)
    }

    async fn keys(&self, _prefix: &str) -> Result<Vec<String>, KnowledgeStoreError> {
        Ok(Vec::new())
    }
}
