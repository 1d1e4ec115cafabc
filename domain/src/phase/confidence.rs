//! Step confidence scoring.
//!
//! When a capability reports its own `confidence` in the result map, that
//! value is used (clamped to `[0, 1]`). Otherwise the score is derived:
//!
//! ```text
//! completeness = populated produced fields / produced fields   (1.0 if none declared)
//! checks       = (checks_total - checks_failed) / checks_total
//!
//! score = 0.6 * completeness + 0.4 * checks     when checks were reported
//! score = completeness                          when no checks were reported
//! ```
//!
//! Checks are read from a `checks` array in the result, each entry an object
//! with a boolean `passed`.

use super::output::is_populated;
use crate::capability::value_objects::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result key carrying a capability-reported confidence.
pub const CONFIDENCE_KEY: &str = "confidence";
/// Result key carrying automated check outcomes.
pub const CHECKS_KEY: &str = "checks";

/// Weights for the derived confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub completeness: f64,
    pub checks: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            completeness: 0.6,
            checks: 0.4,
        }
    }
}

/// Raw counts the derived score is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfidenceInputs {
    pub populated: usize,
    pub required: usize,
    pub checks_failed: usize,
    pub checks_total: usize,
}

impl ConfidenceInputs {
    /// Count populated `produces` fields and failed checks in a result map.
    pub fn from_result(result: &FieldMap, produces: &[String]) -> Self {
        let populated = produces
            .iter()
            .filter(|f| result.get(f.as_str()).is_some_and(is_populated))
            .count();

        let (checks_total, checks_failed) = match result.get(CHECKS_KEY) {
            Some(Value::Array(checks)) => {
                let failed = checks
                    .iter()
                    .filter(|c| c.get("passed").and_then(Value::as_bool) != Some(true))
                    .count();
                (checks.len(), failed)
            }
            _ => (0, 0),
        };

        Self {
            populated,
            required: produces.len(),
            checks_failed,
            checks_total,
        }
    }
}

impl ConfidenceWeights {
    /// Derived score for the given counts, always in `[0, 1]`.
    pub fn score(&self, inputs: &ConfidenceInputs) -> f64 {
        let completeness = if inputs.required == 0 {
            1.0
        } else {
            inputs.populated.min(inputs.required) as f64 / inputs.required as f64
        };

        if inputs.checks_total == 0 {
            return clamp_confidence(completeness);
        }

        let failed = inputs.checks_failed.min(inputs.checks_total);
        let checks = (inputs.checks_total - failed) as f64 / inputs.checks_total as f64;
        let total_weight = self.completeness + self.checks;
        if total_weight <= 0.0 {
            return 0.0;
        }
        clamp_confidence((self.completeness * completeness + self.checks * checks) / total_weight)
    }

    /// Confidence of a step result: the reported value, else the derived score.
    pub fn confidence_for(&self, result: &FieldMap, produces: &[String]) -> f64 {
        match result.get(CONFIDENCE_KEY).and_then(Value::as_f64) {
            Some(reported) => clamp_confidence(reported),
            None => self.score(&ConfidenceInputs::from_result(result, produces)),
        }
    }
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Arithmetic mean of step confidences, summed in step order; 0.0 for no
/// steps.
pub fn mean_confidence(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}
