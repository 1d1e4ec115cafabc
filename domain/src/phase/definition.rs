//! Phase definitions and the built-in requirements phase.

use super::review::ReviewPolicy;
use super::step::{StepDefinition, StepId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration problems detected before any step runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseConfigError {
    #[error("Phase '{phase}' has no steps")]
    NoSteps { phase: String },

    #[error("Phase '{phase}' declares step '{step}' more than once")]
    DuplicateStep { phase: String, step: String },

    #[error("Unknown step '{step}' in step list for phase '{phase}'")]
    UnknownStep { phase: String, step: String },

    #[error("Step '{step}' is bound to unknown agent '{agent}'")]
    UnknownAgent { step: String, agent: String },

    #[error("Step '{step}' uses capability '{capability}' which agent '{agent}' does not provide")]
    UnknownCapability {
        step: String,
        agent: String,
        capability: String,
    },

    #[error("Step '{step}' has an empty capability or method binding")]
    EmptyBinding { step: String },
}

/// An ordered list of steps plus what the phase must produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub name: String,
    pub steps: Vec<StepDefinition>,
    /// Fields that must be populated for the phase to count as completed
    pub required_outputs: Vec<String>,
    /// Fields handed to the next phase
    pub handoff_fields: Vec<String>,
    #[serde(default)]
    pub review: ReviewPolicy,
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            required_outputs: Vec::new(),
            handoff_fields: Vec::new(),
            review: ReviewPolicy::default(),
        }
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_required_outputs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_outputs = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_handoff_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handoff_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_review(mut self, review: ReviewPolicy) -> Self {
        self.review = review;
        self
    }

    pub fn step(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id.as_str() == id)
    }

    pub fn step_ids(&self) -> Vec<&StepId> {
        self.steps.iter().map(|s| &s.id).collect()
    }

    pub fn validate(&self) -> Result<(), PhaseConfigError> {
        if self.steps.is_empty() {
            return Err(PhaseConfigError::NoSteps {
                phase: self.name.clone(),
            });
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(PhaseConfigError::DuplicateStep {
                    phase: self.name.clone(),
                    step: step.id.to_string(),
                });
            }
            if step.capability.trim().is_empty() || step.method.trim().is_empty() {
                return Err(PhaseConfigError::EmptyBinding {
                    step: step.id.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Restrict the phase to the named steps, in the order given.
    pub fn select(&self, ids: &[String]) -> Result<PhaseDefinition, PhaseConfigError> {
        let steps = ids
            .iter()
            .map(|id| {
                self.step(id)
                    .cloned()
                    .ok_or_else(|| PhaseConfigError::UnknownStep {
                        phase: self.name.clone(),
                        step: id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PhaseDefinition {
            steps,
            ..self.clone()
        })
    }

    /// The built-in requirements phase.
    ///
    /// ```text
    /// requirements_analysis → domain_modeling → architecture_design → documentation
    /// ```
    pub fn requirements() -> Self {
        Self::new("requirements")
            .with_step(
                StepDefinition::new(
                    "requirements_analysis",
                    "requirements_analyst",
                    "requirements_analyst",
                    "extract_requirements",
                )
                .requires(["project_name", "description"])
                .accepts(["stakeholders", "constraints"])
                .produces(["requirements", "user_stories"]),
            )
            .with_step(
                StepDefinition::new(
                    "domain_modeling",
                    "domain_modeler",
                    "domain_modeler",
                    "build_domain_model",
                )
                .requires(["requirements"])
                .accepts(["user_stories"])
                .produces(["domain_model"]),
            )
            .with_step(
                StepDefinition::new(
                    "architecture_design",
                    "architect",
                    "architect",
                    "design_architecture",
                )
                .requires(["requirements", "domain_model"])
                .accepts(["constraints"])
                .produces(["architecture"]),
            )
            .with_step(
                StepDefinition::new(
                    "documentation",
                    "documenter",
                    "documenter",
                    "write_specification",
                )
                .requires(["project_name", "requirements", "domain_model", "architecture"])
                .accepts(["user_stories"])
                .produces(["specification"]),
            )
            .with_required_outputs(["requirements", "domain_model", "architecture", "specification"])
            .with_handoff_fields([
                "project_name",
                "requirements",
                "user_stories",
                "domain_model",
                "architecture",
                "specification",
            ])
            .with_review(ReviewPolicy::default().with_always_review("architecture_design"))
    }
}
