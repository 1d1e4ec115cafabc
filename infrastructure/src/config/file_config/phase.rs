//! Phase overrides from TOML (`[phase]` section)

use relay_domain::{ConfigIssue, ConfigIssueCode, PhaseDefinition};
use serde::{Deserialize, Serialize};

/// Raw phase overrides applied to the standard requirements phase
///
/// # Example
///
/// ```toml
/// [phase]
/// review_threshold = 0.7
/// always_review = ["architecture_design", "documentation"]
/// required_outputs = ["requirements", "architecture"]
/// handoff_fields = ["requirements", "architecture"]
/// ```
///
/// `always_review` adds to the built-in set; the list fields replace the
/// built-in lists when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePhaseConfig {
    pub review_threshold: Option<f64>,
    pub always_review: Vec<String>,
    pub required_outputs: Option<Vec<String>>,
    pub handoff_fields: Option<Vec<String>>,
}

impl FilePhaseConfig {
    /// Issues with these overrides relative to `definition`.
    pub fn validate(&self, definition: &PhaseDefinition) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(threshold) = self.review_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ThresholdOutOfRange {
                        field: "phase.review_threshold".to_string(),
                    },
                    format!(
                        "phase.review_threshold must be between 0.0 and 1.0, got {}",
                        threshold
                    ),
                ));
            }
        }

        for step in &self.always_review {
            if definition.step(step).is_none() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownStep {
                        field: "phase.always_review".to_string(),
                        step: step.clone(),
                    },
                    format!(
                        "phase.always_review: phase '{}' has no step '{}', ignoring it",
                        definition.name, step
                    ),
                ));
            }
        }

        issues
    }

    /// Apply the overrides. Unknown `always_review` steps are skipped.
    pub fn apply(&self, mut definition: PhaseDefinition) -> PhaseDefinition {
        if let Some(threshold) = self.review_threshold {
            definition.review = definition.review.with_default_threshold(threshold);
        }
        for step in &self.always_review {
            if definition.step(step).is_some() {
                definition.review = definition.review.with_always_review(step.as_str());
            }
        }
        if let Some(fields) = &self.required_outputs {
            definition.required_outputs = fields.clone();
        }
        if let Some(fields) = &self.handoff_fields {
            definition.handoff_fields = fields.clone();
        }
        definition
    }
}
