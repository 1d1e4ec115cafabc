//! TDD coach: exposes a [`TddCycle`] through the gate pipeline.
//!
//! Cycle violations are business failures, so they come back inside the
//! result (`errors`, `error_code`) rather than as `Err`.

use super::unsupported;
use async_trait::async_trait;
use relay_domain::{Capability, FieldMap, QualityThresholds, TddCycle, TddError, TddPhase};
use serde_json::{Value, json};
use std::sync::Mutex;

pub struct TddCoach {
    cycle: Mutex<TddCycle>,
}

impl Default for TddCoach {
    fn default() -> Self {
        Self::new()
    }
}

impl TddCoach {
    pub fn new() -> Self {
        Self {
            cycle: Mutex::new(TddCycle::new()),
        }
    }

    pub fn with_thresholds(thresholds: QualityThresholds) -> Self {
        Self {
            cycle: Mutex::new(TddCycle::new().with_thresholds(thresholds)),
        }
    }

    fn with_cycle<T>(&self, f: impl FnOnce(&mut TddCycle) -> T) -> Result<T, String> {
        let mut cycle = self
            .cycle
            .lock()
            .map_err(|_| "TDD cycle state is poisoned".to_string())?;
        Ok(f(&mut cycle))
    }
}

fn status(cycle: &TddCycle) -> FieldMap {
    let mut out = FieldMap::new();
    out.insert("phase".into(), json!(cycle.phase().as_str()));
    out.insert("next_phase".into(), json!(cycle.phase().successor().as_str()));
    out.insert("completed_cycles".into(), json!(cycle.completed_cycles()));
    out.insert("thresholds".into(), json!(cycle.thresholds()));
    out
}

fn with_error(mut out: FieldMap, err: TddError) -> FieldMap {
    out.insert("errors".into(), json!([err.to_string()]));
    out.insert("error_code".into(), json!(err.kind().code()));
    out
}

fn number(params: &FieldMap, name: &str) -> Result<f64, String> {
    params
        .get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| format!("parameter '{}' must be a number", name))
}

#[async_trait]
impl Capability for TddCoach {
    fn name(&self) -> &str {
        "tdd_coach"
    }

    fn supported_methods(&self) -> Vec<String> {
        vec![
            "advance".to_string(),
            "complete_cycle".to_string(),
            "status".to_string(),
        ]
    }

    fn validate_params(&self, method: &str, params: &FieldMap) -> Result<(), String> {
        match method {
            "advance" => match params.get("to") {
                None => Ok(()),
                Some(Value::String(s)) => s.parse::<TddPhase>().map(|_| ()),
                Some(_) => Err("parameter 'to' must be a phase name".to_string()),
            },
            "complete_cycle" => {
                number(params, "coverage")?;
                number(params, "mutation_score").map(|_| ())
            }
            "status" => Ok(()),
            other => Err(unsupported(other)),
        }
    }

    async fn execute(&self, method: &str, params: &FieldMap) -> Result<FieldMap, String> {
        match method {
            "advance" => {
                let target = params
                    .get("to")
                    .and_then(Value::as_str)
                    .map(str::parse::<TddPhase>)
                    .transpose()?;
                self.with_cycle(|cycle| {
                    let outcome = match target {
                        Some(to) => cycle.transition(to),
                        None => {
                            cycle.advance();
                            Ok(())
                        }
                    };
                    match outcome {
                        Ok(()) => status(cycle),
                        Err(err) => with_error(status(cycle), err),
                    }
                })
            }
            "complete_cycle" => {
                let coverage = number(params, "coverage")?;
                let mutation_score = number(params, "mutation_score")?;
                self.with_cycle(|cycle| match cycle.complete_cycle(coverage, mutation_score) {
                    Ok(_) => status(cycle),
                    Err(err) => with_error(status(cycle), err),
                })
            }
            "status" => self.with_cycle(|cycle| status(cycle)),
            other => Err(unsupported(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Value)]) -> FieldMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[tokio::test]
    async fn test_advance_through_cycle() {
        let coach = TddCoach::new();
        let out = coach.execute("advance", &FieldMap::new()).await.unwrap();
        assert_eq!(out["phase"], "GREEN");

        let out = coach
            .execute("advance", &params(&[("to", json!("refactor"))]))
            .await
            .unwrap();
        assert_eq!(out["phase"], "REFACTOR");
        assert!(out.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_illegal_transition_reported_in_result() {
        let coach = TddCoach::new();
        let out = coach
            .execute("advance", &params(&[("to", json!("refactor"))]))
            .await
            .unwrap();

        assert_eq!(out["phase"], "RED");
        assert_eq!(out["error_code"], "INVALID_TRANSITION");
        assert_eq!(out["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_cycle_thresholds() {
        let coach = TddCoach::new();
        coach.execute("advance", &FieldMap::new()).await.unwrap();
        coach.execute("advance", &FieldMap::new()).await.unwrap();

        let out = coach
            .execute(
                "complete_cycle",
                &params(&[("coverage", json!(90.0)), ("mutation_score", json!(95.0))]),
            )
            .await
            .unwrap();
        assert_eq!(out["error_code"], "COVERAGE_BELOW_THRESHOLD");
        assert_eq!(out["phase"], "REFACTOR");

        let out = coach
            .execute(
                "complete_cycle",
                &params(&[("coverage", json!(95.0)), ("mutation_score", json!(85.0))]),
            )
            .await
            .unwrap();
        assert!(out.get("errors").is_none());
        assert_eq!(out["phase"], "RED");
        assert_eq!(out["completed_cycles"], 1);
    }

    #[test]
    fn test_validate_params() {
        let coach = TddCoach::new();
        assert!(coach.validate_params("advance", &params(&[("to", json!("blue"))])).is_err());
        assert!(coach
            .validate_params("complete_cycle", &params(&[("coverage", json!(95))]))
            .is_err());
        assert!(coach.validate_params("status", &FieldMap::new()).is_ok());
    }
}
