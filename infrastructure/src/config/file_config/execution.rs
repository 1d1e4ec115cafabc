//! Execution configuration from TOML (`[execution]` section)

use relay_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw execution limits
///
/// ```toml
/// [execution]
/// capability_timeout_seconds = 120   # unset: no limit
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    pub capability_timeout_seconds: Option<u64>,
}

impl FileExecutionConfig {
    pub fn capability_timeout(&self) -> (Option<Duration>, Vec<ConfigIssue>) {
        match self.capability_timeout_seconds {
            Some(0) => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout {
                        field: "execution.capability_timeout_seconds".to_string(),
                    },
                    "execution.capability_timeout_seconds cannot be 0",
                )],
            ),
            Some(secs) => (Some(Duration::from_secs(secs)), vec![]),
            None => (None, vec![]),
        }
    }
}
