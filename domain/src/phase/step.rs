//! Step identifiers and definitions.

use crate::agent::value_objects::AgentId;
use crate::capability::value_objects::FieldMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier of a step within a phase (e.g. `architecture_design`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for StepId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static binding of a step to the single capability that performs it,
/// plus the phase fields it reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: StepId,
    /// Agent whose registry holds the capability
    pub agent: AgentId,
    pub capability: String,
    pub method: String,
    /// Phase fields that must be populated before the step may run
    pub requires: Vec<String>,
    /// Phase fields passed along when present, never required
    #[serde(default)]
    pub accepts: Vec<String>,
    /// Result fields merged into the phase output on success
    pub produces: Vec<String>,
    /// Fixed parameters added to every request of this step
    #[serde(default)]
    pub params: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl StepDefinition {
    pub fn new(
        id: impl Into<StepId>,
        agent: impl Into<AgentId>,
        capability: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent: agent.into(),
            capability: capability.into(),
            method: method.into(),
            requires: Vec::new(),
            accepts: Vec::new(),
            produces: Vec::new(),
            params: FieldMap::new(),
            timeout: None,
        }
    }

    pub fn requires<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn accepts<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn produces<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `capability.method` of the bound capability.
    pub fn operation_name(&self) -> String {
        format!("{}.{}", self.capability, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builder() {
        let step = StepDefinition::new("architecture_design", "architect", "architect", "design")
            .requires(["requirements", "domain_model"])
            .accepts(["constraints"])
            .produces(["architecture"])
            .with_param("style", "layered");

        assert_eq!(step.id.as_str(), "architecture_design");
        assert_eq!(step.requires, vec!["requirements", "domain_model"]);
        assert_eq!(step.accepts, vec!["constraints"]);
        assert_eq!(step.produces, vec!["architecture"]);
        assert_eq!(step.params["style"], "layered");
        assert_eq!(step.operation_name(), "architect.design");
    }

    #[test]
    fn test_step_id_serializes_as_string() {
        let json = serde_json::to_string(&StepId::new("documentation")).unwrap();
        assert_eq!(json, "\"documentation\"");
    }
}
