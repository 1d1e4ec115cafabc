//! Approval mode value object

use serde::{Deserialize, Serialize};

/// Where human approval decisions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Ask a human at the terminal
    #[default]
    Interactive,
    /// Approve everything without asking
    AutoApprove,
    /// Deny everything without asking
    AutoReject,
}

impl ApprovalMode {
    pub const VALID_VALUES: [&'static str; 3] = ["interactive", "auto_approve", "auto_reject"];

    pub fn as_str(&self) -> &str {
        match self {
            ApprovalMode::Interactive => "interactive",
            ApprovalMode::AutoApprove => "auto_approve",
            ApprovalMode::AutoReject => "auto_reject",
        }
    }
}

impl std::fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApprovalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "interactive" => Ok(ApprovalMode::Interactive),
            "auto_approve" | "approve" => Ok(ApprovalMode::AutoApprove),
            "auto_reject" | "reject" => Ok(ApprovalMode::AutoReject),
            _ => Err(format!("Invalid approval mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_interactive() {
        assert_eq!(ApprovalMode::default(), ApprovalMode::Interactive);
    }

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("auto-approve".parse(), Ok(ApprovalMode::AutoApprove));
        assert_eq!("AUTO_REJECT".parse(), Ok(ApprovalMode::AutoReject));
        assert_eq!("reject".parse(), Ok(ApprovalMode::AutoReject));
        assert!("maybe".parse::<ApprovalMode>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ApprovalMode::AutoApprove).unwrap();
        assert_eq!(json, "\"auto_approve\"");
    }
}
