//! RED → GREEN → REFACTOR cycle validator.

use crate::core::error::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a TDD cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TddPhase {
    /// Write a failing test
    #[default]
    Red,
    /// Make it pass
    Green,
    /// Clean up with tests green
    Refactor,
}

impl TddPhase {
    /// The only state this one may move to.
    pub fn successor(&self) -> TddPhase {
        match self {
            TddPhase::Red => TddPhase::Green,
            TddPhase::Green => TddPhase::Refactor,
            TddPhase::Refactor => TddPhase::Red,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TddPhase::Red => "RED",
            TddPhase::Green => "GREEN",
            TddPhase::Refactor => "REFACTOR",
        }
    }
}

impl std::fmt::Display for TddPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TddPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" => Ok(TddPhase::Red),
            "green" => Ok(TddPhase::Green),
            "refactor" => Ok(TddPhase::Refactor),
            _ => Err(format!("Invalid TDD phase: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TddError {
    #[error("Invalid TDD cycle transition {from} -> {to}")]
    InvalidCycleTransition { from: TddPhase, to: TddPhase },

    #[error("Test coverage {actual:.1}% does not exceed required {threshold:.1}%")]
    CoverageThreshold { actual: f64, threshold: f64 },

    #[error("Mutation score {actual:.1}% does not exceed required {threshold:.1}%")]
    MutationScoreThreshold { actual: f64, threshold: f64 },
}

impl TddError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TddError::InvalidCycleTransition { .. } => ErrorKind::InvalidCycleTransition,
            TddError::CoverageThreshold { .. } => ErrorKind::CoverageThreshold,
            TddError::MutationScoreThreshold { .. } => ErrorKind::MutationScoreThreshold,
        }
    }
}

/// Quality bars a cycle must clear before it counts as complete.
///
/// Both comparisons are strict: a coverage of exactly 90.0 fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub min_coverage: f64,
    pub min_mutation_score: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_coverage: 90.0,
            min_mutation_score: 80.0,
        }
    }
}

/// Finite-state validator for one TDD loop.
///
/// Not thread-safe on its own; the owning agent serialises access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TddCycle {
    phase: TddPhase,
    thresholds: QualityThresholds,
    completed_cycles: u32,
}

impl TddCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn phase(&self) -> TddPhase {
        self.phase
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Cycles that passed both quality gates via [`complete_cycle`](Self::complete_cycle).
    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    /// Move to `to`. Only the successor of the current phase is legal.
    pub fn transition(&mut self, to: TddPhase) -> Result<(), TddError> {
        if self.phase.successor() != to {
            return Err(TddError::InvalidCycleTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Advance to the successor phase and return it.
    pub fn advance(&mut self) -> TddPhase {
        self.phase = self.phase.successor();
        self.phase
    }

    pub fn validate_test_coverage(&self, coverage: f64) -> Result<(), TddError> {
        // NaN fails the comparison and is rejected with it.
        if coverage > self.thresholds.min_coverage {
            Ok(())
        } else {
            Err(TddError::CoverageThreshold {
                actual: coverage,
                threshold: self.thresholds.min_coverage,
            })
        }
    }

    pub fn validate_mutation_score(&self, score: f64) -> Result<(), TddError> {
        if score > self.thresholds.min_mutation_score {
            Ok(())
        } else {
            Err(TddError::MutationScoreThreshold {
                actual: score,
                threshold: self.thresholds.min_mutation_score,
            })
        }
    }

    /// Close the cycle: REFACTOR → RED, gated on coverage and mutation score.
    ///
    /// On any error the phase is left unchanged.
    pub fn complete_cycle(&mut self, coverage: f64, mutation_score: f64) -> Result<u32, TddError> {
        if self.phase != TddPhase::Refactor {
            return Err(TddError::InvalidCycleTransition {
                from: self.phase,
                to: TddPhase::Red,
            });
        }
        self.validate_test_coverage(coverage)?;
        self.validate_mutation_score(mutation_score)?;
        self.transition(TddPhase::Red)?;
        self.completed_cycles += 1;
        Ok(self.completed_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_red() {
        assert_eq!(TddCycle::new().phase(), TddPhase::Red);
    }

    #[test]
    fn test_full_loop_returns_to_red() {
        let mut cycle = TddCycle::new();
        cycle.transition(TddPhase::Green).unwrap();
        cycle.transition(TddPhase::Refactor).unwrap();
        cycle.transition(TddPhase::Red).unwrap();
        assert_eq!(cycle.phase(), TddPhase::Red);
    }

    #[test]
    fn test_red_to_refactor_fails() {
        let mut cycle = TddCycle::new();
        let err = cycle.transition(TddPhase::Refactor).unwrap_err();
        assert_eq!(
            err,
            TddError::InvalidCycleTransition {
                from: TddPhase::Red,
                to: TddPhase::Refactor
            }
        );
        assert_eq!(cycle.phase(), TddPhase::Red);
    }

    #[test]
    fn test_green_to_green_fails() {
        let mut cycle = TddCycle::new();
        cycle.transition(TddPhase::Green).unwrap();
        let err = cycle.transition(TddPhase::Green).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCycleTransition);
    }

    #[test]
    fn test_red_to_red_fails() {
        let mut cycle = TddCycle::new();
        assert!(cycle.transition(TddPhase::Red).is_err());
    }

    #[test]
    fn test_coverage_boundary_is_strict() {
        let cycle = TddCycle::new();
        let err = cycle.validate_test_coverage(90.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CoverageThreshold);
        assert!(err.to_string().contains("90.0%"));
        assert!(cycle.validate_test_coverage(90.1).is_ok());
    }

    #[test]
    fn test_mutation_boundary_is_strict() {
        let cycle = TddCycle::new();
        let err = cycle.validate_mutation_score(80.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MutationScoreThreshold);
        assert!(err.to_string().contains("Mutation score"));
        assert!(cycle.validate_mutation_score(80.5).is_ok());
    }

    #[test]
    fn test_nan_coverage_rejected() {
        assert!(TddCycle::new().validate_test_coverage(f64::NAN).is_err());
    }

    #[test]
    fn test_complete_cycle_requires_refactor() {
        let mut cycle = TddCycle::new();
        assert!(cycle.complete_cycle(95.0, 85.0).is_err());
        assert_eq!(cycle.completed_cycles(), 0);
    }

    #[test]
    fn test_complete_cycle_checks_thresholds() {
        let mut cycle = TddCycle::new();
        cycle.advance();
        cycle.advance();
        assert_eq!(cycle.phase(), TddPhase::Refactor);

        let err = cycle.complete_cycle(85.0, 95.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CoverageThreshold);
        assert_eq!(cycle.phase(), TddPhase::Refactor);

        let err = cycle.complete_cycle(95.0, 75.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MutationScoreThreshold);

        assert_eq!(cycle.complete_cycle(95.0, 85.0).unwrap(), 1);
        assert_eq!(cycle.phase(), TddPhase::Red);
    }

    #[test]
    fn test_custom_thresholds() {
        let cycle = TddCycle::new().with_thresholds(QualityThresholds {
            min_coverage: 50.0,
            min_mutation_score: 40.0,
        });
        assert!(cycle.validate_test_coverage(60.0).is_ok());
        assert!(cycle.validate_mutation_score(40.0).is_err());
    }

    #[test]
    fn test_phase_from_str() {
        assert_eq!("green".parse::<TddPhase>().ok(), Some(TddPhase::Green));
        assert_eq!("REFACTOR".parse::<TddPhase>().ok(), Some(TddPhase::Refactor));
        assert!("blue".parse::<TddPhase>().is_err());
    }
}
