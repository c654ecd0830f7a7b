use async_trait::async_trait;
use autocore::{NodeError, Parameters};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Pluggable behavior invoked for a node type.
///
/// Implementations receive the node's static parameters and the
/// upstream payload, and return the payload for downstream nodes.
/// Cross-cutting concerns (timing, logging, error containment) are
/// applied by the scheduler around this call, not by implementations.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    async fn execute(&self, parameters: &Parameters, input: Value) -> Result<Value, NodeError>;
}

/// Registry of node executors, keyed by node type.
///
/// An explicit value constructed at startup and injected into the
/// engine, so tests can build isolated registries. The same executor
/// may be registered under several type aliases.
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    pub fn register(&mut self, node_type: impl Into<String>, executor: Arc<dyn NodeExecutor>) {
        let node_type = node_type.into();
        tracing::debug!("Registering node type: {}", node_type);
        self.executors.insert(node_type, executor);
    }

    pub fn get(&self, node_type: &str) -> Option<&Arc<dyn NodeExecutor>> {
        self.executors.get(node_type)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.executors.contains_key(node_type)
    }

    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.executors.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
