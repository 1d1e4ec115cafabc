//! Static gate policy tables.
//!
//! [`GatePolicy`] answers two questions for a `capability.method` pair:
//!
//! | Table | Gate | Question |
//! |-------|------|----------|
//! | preconditions | precondition | which structured object must the params carry? |
//! | approvals | human approval | must a human sign off before execution? |
//!
//! Entries are keyed by capability and method. A method of `"*"` matches
//! every method of that capability; an exact entry wins over the wildcard.

use super::precondition::UserStory;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Wildcard method in policy keys.
pub const ANY_METHOD: &str = "*";

/// A structured precondition required in the request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Precondition {
    /// `params[param]` must be a `{role, want, benefit}` user story.
    UserStory { param: String },
}

impl Precondition {
    pub fn user_story(param: impl Into<String>) -> Self {
        Precondition::UserStory { param: param.into() }
    }

    /// Check the precondition against request parameters.
    pub fn check(&self, params: &super::value_objects::FieldMap) -> Result<(), String> {
        match self {
            Precondition::UserStory { param } => {
                let value = params
                    .get(param)
                    .ok_or_else(|| format!("missing required user story parameter '{}'", param))?;
                UserStory::parse(value).map(|_| ())
            }
        }
    }
}

type PolicyKey = (String, String);

/// Per-capability / per-method policy for the precondition and approval gates.
#[derive(Debug, Clone, Default)]
pub struct GatePolicy {
    preconditions: HashMap<PolicyKey, Precondition>,
    approvals: HashSet<PolicyKey>,
}

impl GatePolicy {
    /// An empty policy: no preconditions, no approvals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy used by the built-in agents.
    pub fn standard() -> Self {
        Self::new()
            .with_precondition(
                "requirements_analyst",
                "analyze_user_story",
                Precondition::user_story("user_story"),
            )
            .with_approval("tdd_coach", "complete_cycle")
    }

    pub fn with_precondition(
        mut self,
        capability: impl Into<String>,
        method: impl Into<String>,
        precondition: Precondition,
    ) -> Self {
        self.preconditions
            .insert((capability.into(), method.into()), precondition);
        self
    }

    pub fn with_approval(mut self, capability: impl Into<String>, method: impl Into<String>) -> Self {
        self.approvals.insert((capability.into(), method.into()));
        self
    }

    pub fn precondition_for(&self, capability: &str, method: &str) -> Option<&Precondition> {
        self.preconditions
            .get(&(capability.to_string(), method.to_string()))
            .or_else(|| {
                self.preconditions
                    .get(&(capability.to_string(), ANY_METHOD.to_string()))
            })
    }

    pub fn requires_approval(&self, capability: &str, method: &str) -> bool {
        self.approvals
            .contains(&(capability.to_string(), method.to_string()))
            || self
                .approvals
                .contains(&(capability.to_string(), ANY_METHOD.to_string()))
    }

    pub fn precondition_count(&self) -> usize {
        self.preconditions.len()
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::value_objects::FieldMap;
    use serde_json::json;

    #[test]
    fn test_standard_policy() {
        let policy = GatePolicy::standard();
        assert!(
            policy
                .precondition_for("requirements_analyst", "analyze_user_story")
                .is_some()
        );
        assert!(
            policy
                .precondition_for("requirements_analyst", "extract_requirements")
                .is_none()
        );
        assert!(policy.requires_approval("tdd_coach", "complete_cycle"));
        assert!(!policy.requires_approval("tdd_coach", "advance"));
    }

    #[test]
    fn test_wildcard_method() {
        let policy = GatePolicy::new().with_approval("deployer", ANY_METHOD);
        assert!(policy.requires_approval("deployer", "ship"));
        assert!(policy.requires_approval("deployer", "rollback"));
        assert!(!policy.requires_approval("builder", "ship"));
    }

    #[test]
    fn test_exact_precondition_wins_over_wildcard() {
        let policy = GatePolicy::new()
            .with_precondition("a", ANY_METHOD, Precondition::user_story("story"))
            .with_precondition("a", "m", Precondition::user_story("exact"));
        assert_eq!(
            policy.precondition_for("a", "m"),
            Some(&Precondition::user_story("exact"))
        );
        assert_eq!(
            policy.precondition_for("a", "other"),
            Some(&Precondition::user_story("story"))
        );
    }

    #[test]
    fn test_precondition_check() {
        let pre = Precondition::user_story("user_story");

        let mut params = FieldMap::new();
        assert!(pre.check(&params).unwrap_err().contains("missing"));

        params.insert("user_story".into(), json!({"role": "r", "want": "w"}));
        assert!(pre.check(&params).is_err());

        params.insert(
            "user_story".into(),
            json!({"role": "r", "want": "w", "benefit": "b"}),
        );
        assert!(pre.check(&params).is_ok());
    }
}
