//! Accumulated phase output.

use super::step::StepId;
use crate::capability::value_objects::FieldMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Result keys that describe the step itself and are never merged.
const RESERVED_KEYS: &[&str] = &["confidence", "checks", "errors", "error", "error_code"];

/// Whether a field value counts as populated: present, not null, and not an
/// empty string, array or object.
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

/// Insertion-ordered `step -> bool` record, serialized as a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepLedger(Vec<(StepId, bool)>);

impl StepLedger {
    /// Record a value for `step`, replacing an earlier one in place.
    pub fn record(&mut self, step: StepId, value: bool) {
        match self.0.iter_mut().find(|(s, _)| *s == step) {
            Some(entry) => entry.1 = value,
            None => self.0.push((step, value)),
        }
    }

    pub fn get(&self, step: &str) -> Option<bool> {
        self.0
            .iter()
            .find(|(s, _)| s.as_str() == step)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StepId, bool)> {
        self.0.iter().map(|(s, v)| (s, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for StepLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (step, value) in &self.0 {
            map.serialize_entry(step.as_str(), value)?;
        }
        map.end()
    }
}

/// Everything a phase has produced so far.
///
/// Seeded with the caller's input fields, then grows as steps succeed. The
/// validation ledger gets exactly one entry per attempted step; the approval
/// ledger one entry per approval decision.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PhaseOutput {
    phase: String,
    fields: FieldMap,
    validation_results: StepLedger,
    human_approvals: StepLedger,
    finalized: bool,
}

impl PhaseOutput {
    pub fn new(phase: impl Into<String>, seed: FieldMap) -> Self {
        Self {
            phase: phase.into(),
            fields: seed,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(is_populated)
    }

    /// Names from `required` that are not populated, in the given order.
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_field(name))
            .cloned()
            .collect()
    }

    /// Merge step output. With `produces` declared only those fields are
    /// taken; otherwise every non-reserved key is.
    pub fn merge(&mut self, output: &FieldMap, produces: &[String]) {
        if produces.is_empty() {
            for (key, value) in output {
                if !RESERVED_KEYS.contains(&key.as_str()) {
                    self.fields.insert(key.clone(), value.clone());
                }
            }
        } else {
            for name in produces {
                if let Some(value) = output.get(name) {
                    self.fields.insert(name.clone(), value.clone());
                }
            }
        }
    }

    pub fn record_validation(&mut self, step: StepId, passed: bool) {
        self.validation_results.record(step, passed);
    }

    pub fn record_approval(&mut self, step: StepId, approved: bool) {
        self.human_approvals.record(step, approved);
    }

    pub fn validation_results(&self) -> &StepLedger {
        &self.validation_results
    }

    pub fn human_approvals(&self) -> &StepLedger {
        &self.human_approvals
    }

    /// Populated fields named in `fields`, for the next phase.
    pub fn handoff(&self, fields: &[String]) -> FieldMap {
        fields
            .iter()
            .filter_map(|name| {
                self.fields
                    .get(name)
                    .filter(|v| is_populated(v))
                    .map(|v| (name.clone(), v.clone()))
            })
            .collect()
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
