//! Approval configuration from TOML (`[approval]` section)

use relay_domain::{ApprovalMode, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw approval configuration from TOML
///
/// # Example
///
/// ```toml
/// [approval]
/// mode = "interactive"      # "interactive", "auto_approve", "auto_reject"
/// timeout_seconds = 300     # silence longer than this counts as a denial
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApprovalConfig {
    pub mode: String,
    pub timeout_seconds: u64,
}

impl Default for FileApprovalConfig {
    fn default() -> Self {
        Self {
            mode: ApprovalMode::default().as_str().to_string(),
            timeout_seconds: 300,
        }
    }
}

impl FileApprovalConfig {
    /// Parse `mode`, falling back to `interactive` with a warning.
    pub fn parse_mode(&self) -> (ApprovalMode, Vec<ConfigIssue>) {
        match self.mode.parse::<ApprovalMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "approval.mode".to_string(),
                        value: self.mode.clone(),
                        valid_values: ApprovalMode::VALID_VALUES
                            .iter()
                            .map(|v| v.to_string())
                            .collect(),
                    },
                    format!(
                        "approval.mode: unknown value '{}', falling back to 'interactive'",
                        self.mode
                    ),
                );
                (ApprovalMode::default(), vec![issue])
            }
        }
    }

    pub fn timeout(&self) -> (Duration, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout {
                    field: "approval.timeout_seconds".to_string(),
                },
                "approval.timeout_seconds cannot be 0",
            ));
        }
        (Duration::from_secs(self.timeout_seconds), issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileApprovalConfig::default();
        let (mode, issues) = config.parse_mode();
        assert_eq!(mode, ApprovalMode::Interactive);
        assert!(issues.is_empty());
        assert_eq!(config.timeout().0, Duration::from_secs(300));
    }

    #[test]
    fn test_unknown_mode_falls_back() {
        let config = FileApprovalConfig {
            mode: "yolo".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_mode();
        assert_eq!(mode, ApprovalMode::Interactive);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let config = FileApprovalConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let (_, issues) = config.timeout();
        assert!(issues[0].is_error());
    }
}
