//! Knowledge store adapters.

mod memory;

pub use memory::InMemoryKnowledgeStore;
