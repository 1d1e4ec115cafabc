//! In-process knowledge store.
//!
//! A `BTreeMap` behind a `tokio::sync::RwLock`: writes are visible to every
//! later read, and key listings come back sorted.

use async_trait::async_trait;
use relay_application::{KnowledgeStoreError, KnowledgeStorePort};
use relay_domain::FieldMap;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    entries: RwLock<BTreeMap<String, FieldMap>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, for dumping the store after a run.
    pub async fn snapshot(&self) -> BTreeMap<String, FieldMap> {
        self.entries.read().await.clone()
    }
}

fn validate_key(key: &str) -> Result<(), KnowledgeStoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.ends_with('/')
        && !key.split('/').any(|segment| segment.trim().is_empty());
    if valid {
        Ok(())
    } else {
        Err(KnowledgeStoreError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl KnowledgeStorePort for InMemoryKnowledgeStore {
    async fn store(&self, key: &str, value: FieldMap) -> Result<(), KnowledgeStoreError> {
        validate_key(key)?;
        debug!(key = key, fields = value.len(), "Knowledge stored");
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<FieldMap>, KnowledgeStoreError> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, KnowledgeStoreError> {
        Ok(self
            .entries
            .read()
            .await
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
