//! Human review policy for step results.

use super::step::StepId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.7;

/// Decides whether a step result needs a human to look at it.
///
/// A result needs review when it has errors, when its step is listed in
/// `always_review`, or when its confidence is below the step's threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    pub default_threshold: f64,
    /// Per-step overrides of the default threshold
    #[serde(default)]
    pub thresholds: BTreeMap<StepId, f64>,
    #[serde(default)]
    pub always_review: BTreeSet<StepId>,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_REVIEW_THRESHOLD,
            thresholds: BTreeMap::new(),
            always_review: BTreeSet::new(),
        }
    }
}

impl ReviewPolicy {
    pub fn with_default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    pub fn with_threshold(mut self, step: impl Into<StepId>, threshold: f64) -> Self {
        self.thresholds.insert(step.into(), threshold);
        self
    }

    pub fn with_always_review(mut self, step: impl Into<StepId>) -> Self {
        self.always_review.insert(step.into());
        self
    }

    pub fn threshold_for(&self, step: &StepId) -> f64 {
        self.thresholds
            .get(step)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    pub fn requires_review(&self, step: &StepId, confidence: f64, has_errors: bool) -> bool {
        has_errors || self.always_review.contains(step) || confidence < self.threshold_for(step)
    }
}
