//! Capability registry
//!
//! One [`CapabilityRegistry`] belongs to exactly one agent. It checks each
//! capability against the contract when it is registered and caches the
//! supported method list, so a malformed capability fails at startup rather
//! than on its first call.
//!
//! ```ignore
//! let mut registry = CapabilityRegistry::new();
//! registry.register(RequirementsAnalyst::new())?;
//! assert_eq!(registry.list(), vec!["requirements_analyst"]);
//!
//! // A second registration needs an explicit replace
//! registry.replace(Arc::new(StubAnalyst::default()))?;
//! ```

use super::error::CapabilityError;
use super::traits::Capability;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A capability accepted by the registry, with its methods resolved.
#[derive(Clone)]
pub struct RegisteredCapability {
    capability: Arc<dyn Capability>,
    methods: Vec<String>,
}

impl RegisteredCapability {
    pub fn name(&self) -> &str {
        self.capability.name()
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn supports(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    pub fn capability(&self) -> &Arc<dyn Capability> {
        &self.capability
    }
}

impl std::fmt::Debug for RegisteredCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCapability")
            .field("name", &self.name())
            .field("methods", &self.methods)
            .finish()
    }
}

/// Named capabilities of one agent, in registration order.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: Vec<RegisteredCapability>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Fails if the name is already taken.
    pub fn register<C: Capability + 'static>(&mut self, capability: C) -> Result<(), CapabilityError> {
        self.register_arc(Arc::new(capability))
    }

    /// Register a shared capability. Fails if the name is already taken.
    pub fn register_arc(&mut self, capability: Arc<dyn Capability>) -> Result<(), CapabilityError> {
        let entry = Self::check_contract(capability)?;
        let name = entry.name().to_string();
        if self.index.contains_key(&name) {
            return Err(CapabilityError::Duplicate { name });
        }

        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Register a capability, replacing any existing one with the same name.
    ///
    /// The replacement keeps the original's position in [`list`](Self::list).
    /// Returns the capability that was replaced, if any.
    pub fn replace(
        &mut self,
        capability: Arc<dyn Capability>,
    ) -> Result<Option<Arc<dyn Capability>>, CapabilityError> {
        let entry = Self::check_contract(capability)?;
        let name = entry.name().to_string();
        match self.index.get(&name) {
            Some(&pos) => {
                let previous = std::mem::replace(&mut self.entries[pos], entry);
                Ok(Some(previous.capability))
            }
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push(entry);
                Ok(None)
            }
        }
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredCapability> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Capability names in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_contract(capability: Arc<dyn Capability>) -> Result<RegisteredCapability, CapabilityError> {
        let name = capability.name().trim().to_string();
        let incompatible = |reason: &str| CapabilityError::Incompatible {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(incompatible("capability name is empty"));
        }
        if name != capability.name() {
            return Err(incompatible("capability name has surrounding whitespace"));
        }

        let methods = capability.supported_methods();
        if methods.is_empty() {
            return Err(incompatible("no supported methods"));
        }
        if methods.iter().any(|m| m.trim().is_empty()) {
            return Err(incompatible("empty method name"));
        }
        let unique: HashSet<&str> = methods.iter().map(String::as_str).collect();
        if unique.len() != methods.len() {
            return Err(incompatible("duplicate method names"));
        }

        Ok(RegisteredCapability { capability, methods })
    }
}
