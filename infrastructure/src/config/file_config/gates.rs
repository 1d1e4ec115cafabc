//! Gate policy additions from TOML (`[gates]` section)

use relay_domain::capability::policy::ANY_METHOD;
use relay_domain::{GatePolicy, Precondition};
use serde::{Deserialize, Serialize};

/// Raw gate policy additions, merged on top of the built-in policy.
///
/// # Example
///
/// ```toml
/// [[gates.preconditions]]
/// capability = "requirements_analyst"
/// method = "refine_story"
/// user_story = "story"          # params["story"] must be a user story
///
/// [[gates.approvals]]
/// capability = "deployer"       # method defaults to "*"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatesConfig {
    pub preconditions: Vec<FilePreconditionEntry>,
    pub approvals: Vec<FileApprovalEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePreconditionEntry {
    pub capability: String,
    #[serde(default = "any_method")]
    pub method: String,
    /// Parameter that must hold a `{role, want, benefit}` user story
    pub user_story: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileApprovalEntry {
    pub capability: String,
    #[serde(default = "any_method")]
    pub method: String,
}

fn any_method() -> String {
    ANY_METHOD.to_string()
}

impl FileGatesConfig {
    /// Add the configured entries to `policy`.
    pub fn apply(&self, policy: GatePolicy) -> GatePolicy {
        let policy = self.preconditions.iter().fold(policy, |policy, entry| {
            policy.with_precondition(
                &entry.capability,
                &entry.method,
                Precondition::user_story(&entry.user_story),
            )
        });
        self.approvals.iter().fold(policy, |policy, entry| {
            policy.with_approval(&entry.capability, &entry.method)
        })
    }
}
