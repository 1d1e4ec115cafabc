//! The set of agents a phase may dispatch to.

use super::runtime::Agent;
use relay_domain::AgentId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct AgentPool {
    agents: HashMap<AgentId, Arc<Agent>>,
    order: Vec<AgentId>,
}

impl AgentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent, replacing any agent with the same id.
    pub fn insert(&mut self, agent: Agent) -> Option<Arc<Agent>> {
        let id = agent.id().clone();
        let previous = self.agents.insert(id.clone(), Arc::new(agent));
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.insert(agent);
        self
    }

    pub fn get(&self, id: &AgentId) -> Option<&Arc<Agent>> {
        self.agents.get(id)
    }

    /// Agent ids in insertion order.
    pub fn ids(&self) -> &[AgentId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::CapabilityRegistry;

    #[test]
    fn test_insert_and_replace() {
        let mut pool = AgentPool::new()
            .with_agent(Agent::new("b", CapabilityRegistry::new()))
            .with_agent(Agent::new("a", CapabilityRegistry::new()));
        assert_eq!(pool.len(), 2);

        let replaced = pool.insert(Agent::new("b", CapabilityRegistry::new()));
        assert!(replaced.is_some());
        assert_eq!(pool.len(), 2);

        let ids: Vec<&str> = pool.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(pool.get(&AgentId::new("a")).is_some());
        assert!(pool.get(&AgentId::new("c")).is_none());
    }
}
