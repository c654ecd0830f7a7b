//! Workflow execution engine
//!
//! Takes a declarative graph of nodes and edges and runs it to
//! completion: dependency-ordered scheduling, per-node error
//! containment, and progressive result streaming to observers.

mod engine;
mod executor;
mod graph;
mod registry;

pub use engine::{Engine, EngineConfig};
pub use graph::AdjacencyIndex;
pub use registry::{ExecutorRegistry, NodeExecutor};
