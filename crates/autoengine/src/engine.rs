use crate::executor::WorkflowExecutor;
use crate::registry::ExecutorRegistry;
use autocore::{
    EventBus, ExecutionEvent, ExecutionRecord, ExecutionStatus, NodeExecutionResult, TriggeredBy,
    Workflow, WorkflowEdge, WorkflowNode,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Engine front door: owns the executor registry and the event bus,
/// and exposes the batch, streaming, and cancellable entry points.
///
/// All per-run state lives on the stack of a single `execute_*` call,
/// so one engine can serve any number of concurrent runs.
pub struct Engine {
    registry: Arc<ExecutorRegistry>,
    executor: WorkflowExecutor,
    event_bus: Arc<EventBus>,
}

impl Engine {
    pub fn new(registry: Arc<ExecutorRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<ExecutorRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            executor: WorkflowExecutor::new(),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
        }
    }

    pub fn registry(&self) -> &Arc<ExecutorRegistry> {
        &self.registry
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    /// Batch form: run the graph and return the full record.
    ///
    /// Structural failures (bad graph) come back as a record with
    /// `status: Error`, not as a call-level error; per-node failures
    /// are contained inside the record's `node_results`.
    pub async fn execute(&self, nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> ExecutionRecord {
        self.run(
            nodes,
            edges,
            None,
            TriggeredBy::Manual,
            Value::Null,
            &CancellationToken::new(),
            None,
        )
        .await
    }

    /// Batch form with an initial payload: the first node (and every
    /// root) sees `input` as its upstream data instead of null.
    pub async fn execute_with_input(
        &self,
        nodes: &[WorkflowNode],
        edges: &[WorkflowEdge],
        input: Value,
    ) -> ExecutionRecord {
        self.run(
            nodes,
            edges,
            None,
            TriggeredBy::Manual,
            input,
            &CancellationToken::new(),
            None,
        )
        .await
    }

    /// Streaming form: invokes `on_node_complete` once per finished
    /// node, in completion order, before returning the full record.
    pub async fn execute_with_progress<F>(
        &self,
        nodes: &[WorkflowNode],
        edges: &[WorkflowEdge],
        mut on_node_complete: F,
    ) -> ExecutionRecord
    where
        F: FnMut(&NodeExecutionResult),
    {
        self.run(
            nodes,
            edges,
            None,
            TriggeredBy::Manual,
            Value::Null,
            &CancellationToken::new(),
            Some(&mut on_node_complete),
        )
        .await
    }

    /// Cancellable form: the token is checked before each node; on
    /// cancellation the run exits cooperatively with `status:
    /// Cancelled` and the results gathered so far.
    pub async fn execute_cancellable(
        &self,
        nodes: &[WorkflowNode],
        edges: &[WorkflowEdge],
        cancellation: &CancellationToken,
    ) -> ExecutionRecord {
        self.run(
            nodes,
            edges,
            None,
            TriggeredBy::Manual,
            Value::Null,
            cancellation,
            None,
        )
        .await
    }

    /// Run a stored workflow definition, tagging the record with its
    /// id and seeding the propagation slot with `input`.
    pub async fn execute_workflow(
        &self,
        workflow: &Workflow,
        triggered_by: TriggeredBy,
        input: Value,
    ) -> ExecutionRecord {
        self.run(
            &workflow.nodes,
            &workflow.edges,
            Some(workflow.id),
            triggered_by,
            input,
            &CancellationToken::new(),
            None,
        )
        .await
    }

    async fn run(
        &self,
        nodes: &[WorkflowNode],
        edges: &[WorkflowEdge],
        workflow_id: Option<Uuid>,
        triggered_by: TriggeredBy,
        initial_input: Value,
        cancellation: &CancellationToken,
        on_node_complete: Option<&mut dyn FnMut(&NodeExecutionResult)>,
    ) -> ExecutionRecord {
        let mut record = ExecutionRecord::start(workflow_id, triggered_by);
        let start = Instant::now();

        tracing::info!("Starting execution {} with {} nodes", record.id, nodes.len());
        self.event_bus.emit(ExecutionEvent::ExecutionStarted {
            execution_id: record.id,
            timestamp: Utc::now(),
        });

        let outcome = self
            .executor
            .execute_chain(
                nodes,
                edges,
                self.registry.as_ref(),
                self.event_bus.as_ref(),
                record.id,
                initial_input,
                cancellation,
                on_node_complete,
            )
            .await;

        match outcome {
            Ok(chain) => {
                record.node_results = chain.results;
                let status = if chain.cancelled {
                    ExecutionStatus::Cancelled
                } else {
                    ExecutionStatus::Success
                };
                record.finish(status);
            }
            Err(e) => {
                tracing::error!("Execution {} failed: {}", record.id, e);
                record.error = Some(e.to_string());
                record.finish(ExecutionStatus::Error);
            }
        }

        self.event_bus.emit(ExecutionEvent::ExecutionFinished {
            execution_id: record.id,
            status: record.status,
            duration_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });
        tracing::info!(
            "Execution {} finished with status {:?} ({} node results)",
            record.id,
            record.status,
            record.node_results.len()
        );

        record
    }
}

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the broadcast event bus.
    pub event_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
        }
    }
}
