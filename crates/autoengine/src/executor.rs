use crate::graph::AdjacencyIndex;
use crate::registry::ExecutorRegistry;
use autocore::{
    EventBus, ExecutionEvent, ExecutionId, GraphError, NodeExecutionResult, WorkflowEdge,
    WorkflowNode,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tokio_util::sync::CancellationToken;

/// Outcome of driving one graph to completion.
pub(crate) struct ChainOutcome {
    /// Per-node results in completion order.
    pub results: Vec<NodeExecutionResult>,
    /// True when the run exited early through the cancellation token.
    pub cancelled: bool,
}

/// Drives a workflow graph: dependency-ordered traversal, one node at
/// a time, with per-node error containment.
pub struct WorkflowExecutor;

impl WorkflowExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute the node chain in topological order.
    ///
    /// Scheduling is Kahn-style: dependency counts are computed once
    /// from the adjacency index and a node is enqueued exactly when its
    /// last dependency resolves, so every node runs at most once and
    /// never before its predecessors. Roots are seeded in node-list
    /// order, which makes traversal deterministic, fan-in included.
    ///
    /// Data propagation uses a single `previous_output` slot, seeded
    /// with the caller's initial input: each node's input is the most
    /// recently completed node's output. At a fan-in this is
    /// last-writer-wins, not a merge of all predecessor outputs.
    /// Failed nodes never write the slot, so downstream nodes see the
    /// last successful output.
    pub(crate) async fn execute_chain(
        &self,
        nodes: &[WorkflowNode],
        edges: &[WorkflowEdge],
        registry: &ExecutorRegistry,
        event_bus: &EventBus,
        execution_id: ExecutionId,
        initial_input: Value,
        cancellation: &CancellationToken,
        mut on_node_complete: Option<&mut dyn FnMut(&NodeExecutionResult)>,
    ) -> Result<ChainOutcome, GraphError> {
        let index = AdjacencyIndex::build(nodes, edges)?;
        let node_of: HashMap<&str, &WorkflowNode> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut in_degree = index.in_degrees();
        let mut queue: VecDeque<String> = index.roots().iter().cloned().collect();
        let mut results: Vec<NodeExecutionResult> = Vec::with_capacity(nodes.len());
        let mut previous_output = initial_input;

        while let Some(node_id) = queue.pop_front() {
            if cancellation.is_cancelled() {
                tracing::info!("Execution {} cancelled, stopping after {} nodes", execution_id, results.len());
                return Ok(ChainOutcome {
                    results,
                    cancelled: true,
                });
            }

            let node = node_of[node_id.as_str()];

            event_bus.emit(ExecutionEvent::NodeStarted {
                execution_id,
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
                timestamp: Utc::now(),
            });

            let started_at = Utc::now();
            tracing::debug!("Executing node {} (type: {})", node.id, node.node_type);

            // Containment boundary: a failing node becomes an error
            // result for that node, never an aborted run.
            let result = match dispatch(registry, node, previous_output.clone()).await {
                Ok(data) => NodeExecutionResult::success(node.id.clone(), data, started_at),
                Err(e) => {
                    tracing::error!("Node {} failed: {}", node.id, e);
                    NodeExecutionResult::failure(node.id.clone(), e.to_string(), started_at)
                }
            };

            if result.is_success() {
                previous_output = result.data.clone().unwrap_or(Value::Null);
            }

            event_bus.emit(ExecutionEvent::NodeFinished {
                execution_id,
                result: result.clone(),
            });
            if let Some(callback) = on_node_complete.as_deref_mut() {
                callback(&result);
            }
            results.push(result);

            for successor in index.successors(&node_id) {
                let remaining = in_degree
                    .get_mut(successor)
                    .expect("successor present in in-degree map");
                *remaining -= 1;
                if *remaining == 0 {
                    queue.push_back(successor.clone());
                }
            }
        }

        Ok(ChainOutcome {
            results,
            cancelled: false,
        })
    }
}

impl Default for WorkflowExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up the executor for a node type and invoke it.
///
/// Unknown types degrade to pass-through with a warning rather than
/// failing the node, so a graph containing not-yet-implemented node
/// types still runs end to end.
async fn dispatch(
    registry: &ExecutorRegistry,
    node: &WorkflowNode,
    input: Value,
) -> Result<Value, autocore::NodeError> {
    match registry.get(&node.node_type) {
        Some(executor) => executor.execute(&node.parameters, input).await,
        None => {
            tracing::warn!("Unknown node type: {}, passing through", node.node_type);
            Ok(input)
        }
    }
}
