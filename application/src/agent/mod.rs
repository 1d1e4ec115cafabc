//! Agent runtime
//!
//! An [`Agent`] owns one capability registry, its status, its compliance
//! flags and its task history. An [`AgentPool`] maps step bindings to agents.

pub mod pool;
pub mod runtime;

pub use pool::AgentPool;
pub use runtime::{Agent, AgentState};
