//! Built-in agents
//!
//! Deterministic, offline implementations of the agents the standard
//! requirements phase binds to, plus a TDD coach. Each agent owns a registry
//! holding a single capability of the same name.
//!
//! | Agent | Methods |
//! |-------|---------|
//! | `requirements_analyst` | `extract_requirements`, `analyze_user_story` |
//! | `domain_modeler` | `build_domain_model` |
//! | `architect` | `design_architecture` |
//! | `documenter` | `write_specification` |
//! | `tdd_coach` | `advance`, `complete_cycle`, `status` |

mod architect;
mod documenter;
mod domain_modeler;
mod requirements;
mod tdd_coach;

pub use architect::Architect;
pub use documenter::Documenter;
pub use domain_modeler::DomainModeler;
pub use requirements::RequirementsAnalyst;
pub use tdd_coach::TddCoach;

use relay_application::{Agent, AgentPool};
use relay_domain::{Capability, CapabilityError, CapabilityRegistry, FieldMap};
use serde_json::{Value, json};

/// Every built-in agent, ready for [`PhaseDefinition::requirements`](relay_domain::PhaseDefinition::requirements).
pub fn standard_agents() -> Result<AgentPool, CapabilityError> {
    Ok(AgentPool::new()
        .with_agent(single("requirements_analyst", RequirementsAnalyst)?)
        .with_agent(single("domain_modeler", DomainModeler)?)
        .with_agent(single("architect", Architect)?)
        .with_agent(single("documenter", Documenter)?)
        .with_agent(single("tdd_coach", TddCoach::new())?))
}

fn single<C: Capability + 'static>(id: &str, capability: C) -> Result<Agent, CapabilityError> {
    let mut registry = CapabilityRegistry::new();
    registry.register(capability)?;
    Ok(Agent::new(id, registry))
}

// ==================== Parameter helpers ====================

fn require_str<'a>(params: &'a FieldMap, name: &str) -> Result<&'a str, String> {
    match params.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) => Err(format!("parameter '{}' is empty", name)),
        Some(_) => Err(format!("parameter '{}' must be a string", name)),
        None => Err(format!("missing required parameter '{}'", name)),
    }
}

fn require_present(params: &FieldMap, name: &str) -> Result<(), String> {
    match params.get(name) {
        Some(Value::Null) | None => Err(format!("missing required parameter '{}'", name)),
        Some(_) => Ok(()),
    }
}

/// A string, or an array whose string items are kept.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn check(name: &str, passed: bool) -> Value {
    json!({ "name": name, "passed": passed })
}

fn unsupported(method: &str) -> String {
    format!("unsupported method '{}'", method)
}
