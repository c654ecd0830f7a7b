use async_trait::async_trait;
use autocore::{
    ExecutionEvent, ExecutionStatus, NodeError, Parameters, TriggeredBy, Workflow, WorkflowEdge,
    WorkflowNode,
};
use autoengine::{Engine, ExecutorRegistry, NodeExecutor};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outputs a fixed value, ignoring its input.
struct TagExecutor(Value);

#[async_trait]
impl NodeExecutor for TagExecutor {
    async fn execute(&self, _parameters: &Parameters, _input: Value) -> Result<Value, NodeError> {
        Ok(self.0.clone())
    }
}

/// Always fails with a fixed message.
struct FailExecutor(&'static str);

#[async_trait]
impl NodeExecutor for FailExecutor {
    async fn execute(&self, _parameters: &Parameters, _input: Value) -> Result<Value, NodeError> {
        Err(NodeError::ExecutionFailed(self.0.to_string()))
    }
}

/// Echoes its input back, so data propagation is observable.
struct EchoExecutor;

#[async_trait]
impl NodeExecutor for EchoExecutor {
    async fn execute(&self, _parameters: &Parameters, input: Value) -> Result<Value, NodeError> {
        Ok(input)
    }
}

fn node(id: &str, node_type: &str) -> WorkflowNode {
    WorkflowNode::new(id, node_type)
}

fn edge(source: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge::new(source, target)
}

fn engine_with(register: impl FnOnce(&mut ExecutorRegistry)) -> Engine {
    let mut registry = ExecutorRegistry::new();
    register(&mut registry);
    Engine::new(Arc::new(registry))
}

fn position_of(record: &autocore::ExecutionRecord, node_id: &str) -> usize {
    record
        .node_results
        .iter()
        .position(|r| r.node_id == node_id)
        .unwrap_or_else(|| panic!("no result for node {}", node_id))
}

#[tokio::test]
async fn executes_linear_chain_in_edge_order() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let nodes = vec![node("a", "echo"), node("b", "echo"), node("c", "echo")];
    let edges = vec![edge("a", "b"), edge("b", "c")];

    let record = engine.execute(&nodes, &edges).await;

    assert_eq!(record.status, ExecutionStatus::Success);
    assert_eq!(record.node_results.len(), 3);
    // Every edge (u -> v): u completes before v executes.
    assert!(position_of(&record, "a") < position_of(&record, "b"));
    assert!(position_of(&record, "b") < position_of(&record, "c"));
    for result in &record.node_results {
        assert!(result.started_at <= result.finished_at);
    }
}

#[tokio::test]
async fn fan_in_node_executes_exactly_once() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    // Diamond: a feeds b and c, both feed d.
    let nodes = vec![
        node("a", "echo"),
        node("b", "echo"),
        node("c", "echo"),
        node("d", "echo"),
    ];
    let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];

    let record = engine.execute(&nodes, &edges).await;

    assert_eq!(record.status, ExecutionStatus::Success);
    assert_eq!(record.node_results.len(), 4);
    let d_count = record
        .node_results
        .iter()
        .filter(|r| r.node_id == "d")
        .count();
    assert_eq!(d_count, 1, "fan-in node must execute exactly once");
    assert!(position_of(&record, "b") < position_of(&record, "d"));
    assert!(position_of(&record, "c") < position_of(&record, "d"));
}

#[tokio::test]
async fn graph_without_roots_fails_the_run() {
    let engine = engine_with(|_| {});

    let nodes = vec![node("a", "echo"), node("b", "echo")];
    let edges = vec![edge("a", "b"), edge("b", "a")];

    let record = engine.execute(&nodes, &edges).await;

    assert_eq!(record.status, ExecutionStatus::Error);
    assert!(record.node_results.is_empty(), "no node may run");
    assert!(record
        .error
        .as_deref()
        .unwrap()
        .contains("No starting node"));
}

#[tokio::test]
async fn cycle_behind_a_root_fails_before_any_node_runs() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let nodes = vec![node("root", "echo"), node("b", "echo"), node("c", "echo")];
    let edges = vec![edge("root", "b"), edge("b", "c"), edge("c", "b")];

    let record = engine.execute(&nodes, &edges).await;

    assert_eq!(record.status, ExecutionStatus::Error);
    assert!(record.node_results.is_empty());
    assert!(record.error.as_deref().unwrap().contains("Cycle"));
}

#[tokio::test]
async fn node_failure_is_contained_and_downstream_still_runs() {
    let engine = engine_with(|r| r.register("boom", Arc::new(FailExecutor("boom"))));

    // "unknown" is not registered: it passes through with a warning.
    let nodes = vec![node("a", "boom"), node("b", "unknown")];
    let edges = vec![edge("a", "b")];

    let record = engine.execute(&nodes, &edges).await;

    // One bad node does not sink the run.
    assert_eq!(record.status, ExecutionStatus::Success);

    let a = record.result_for("a").unwrap();
    assert_eq!(a.status, ExecutionStatus::Error);
    assert_eq!(a.error.as_deref(), Some("boom"));
    assert!(a.data.is_none());

    // b runs with the last successful output, which is still the
    // initial null: a's failure never wrote the propagation slot.
    let b = record.result_for("b").unwrap();
    assert_eq!(b.status, ExecutionStatus::Success);
    assert_eq!(b.data, Some(Value::Null));
}

#[tokio::test]
async fn fan_in_input_is_last_writer_wins() {
    // Propagation uses a single slot, deliberately: with a and b both
    // feeding c and no edge between them, c receives whichever sibling
    // completed last, not a merge. Roots are seeded in node-list
    // order, so b (listed second) is the deterministic last writer.
    let engine = engine_with(|r| {
        r.register("tag_a", Arc::new(TagExecutor(json!({"from": "a"}))));
        r.register("tag_b", Arc::new(TagExecutor(json!({"from": "b"}))));
        r.register("echo", Arc::new(EchoExecutor));
    });

    let nodes = vec![node("a", "tag_a"), node("b", "tag_b"), node("c", "echo")];
    let edges = vec![edge("a", "c"), edge("b", "c")];

    let record = engine.execute(&nodes, &edges).await;

    assert_eq!(record.status, ExecutionStatus::Success);
    let c = record.result_for("c").unwrap();
    assert_eq!(c.data, Some(json!({"from": "b"})));
}

#[tokio::test]
async fn initial_input_seeds_the_first_node() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let nodes = vec![node("a", "echo"), node("b", "echo")];
    let edges = vec![edge("a", "b")];

    let record = engine
        .execute_with_input(&nodes, &edges, json!({"x": 1}))
        .await;

    assert_eq!(record.status, ExecutionStatus::Success);
    // The seed flows through the whole chain of pass-through nodes.
    assert_eq!(record.result_for("a").unwrap().data, Some(json!({"x": 1})));
    assert_eq!(record.result_for("b").unwrap().data, Some(json!({"x": 1})));
}

#[tokio::test]
async fn execute_workflow_seeds_the_input() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let mut workflow = Workflow::new("seeded");
    workflow.add_node(node("a", "echo"));

    let record = engine
        .execute_workflow(&workflow, TriggeredBy::Manual, json!({"x": 1}))
        .await;

    assert_eq!(record.result_for("a").unwrap().data, Some(json!({"x": 1})));
}

#[tokio::test]
async fn progress_sink_sees_results_in_completion_order() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let nodes = vec![node("a", "echo"), node("b", "echo")];
    let edges = vec![edge("a", "b")];

    let mut seen = Vec::new();
    let record = engine
        .execute_with_progress(&nodes, &edges, |result| {
            seen.push(result.node_id.clone());
        })
        .await;

    let order: Vec<String> = record
        .node_results
        .iter()
        .map(|r| r.node_id.clone())
        .collect();
    assert_eq!(seen, order);
    assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn cancelled_token_stops_the_run_cooperatively() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let nodes = vec![node("a", "echo"), node("b", "echo")];
    let edges = vec![edge("a", "b")];

    let token = CancellationToken::new();
    token.cancel();

    let record = engine.execute_cancellable(&nodes, &edges, &token).await;

    assert_eq!(record.status, ExecutionStatus::Cancelled);
    assert!(record.node_results.is_empty());
    assert!(record.finished_at.is_some());
}

#[tokio::test]
async fn events_bracket_the_run_and_stream_node_results() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));
    let mut events = engine.subscribe_events();

    let nodes = vec![node("a", "echo"), node("b", "echo")];
    let edges = vec![edge("a", "b")];

    let record = engine.execute(&nodes, &edges).await;

    assert!(matches!(
        events.try_recv().unwrap(),
        ExecutionEvent::ExecutionStarted { execution_id, .. } if execution_id == record.id
    ));

    let mut finished_nodes = Vec::new();
    loop {
        match events.try_recv().unwrap() {
            ExecutionEvent::NodeStarted { .. } => {}
            ExecutionEvent::NodeFinished { result, .. } => finished_nodes.push(result.node_id),
            ExecutionEvent::ExecutionFinished { status, .. } => {
                assert_eq!(status, ExecutionStatus::Success);
                break;
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(finished_nodes, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn duplicate_node_ids_fail_structurally() {
    let engine = engine_with(|_| {});

    let nodes = vec![node("a", "echo"), node("a", "echo")];
    let record = engine.execute(&nodes, &[]).await;

    assert_eq!(record.status, ExecutionStatus::Error);
    assert!(record.error.as_deref().unwrap().contains("Duplicate"));
}

#[tokio::test]
async fn execute_workflow_tags_the_record() {
    let engine = engine_with(|r| r.register("echo", Arc::new(EchoExecutor)));

    let mut workflow = Workflow::new("tagged");
    let a = workflow.add_node(node("a", "echo"));
    let b = workflow.add_node(node("b", "echo"));
    workflow.connect(a, b);

    let record = engine
        .execute_workflow(&workflow, TriggeredBy::Webhook, Value::Null)
        .await;

    assert_eq!(record.workflow_id, Some(workflow.id));
    assert_eq!(record.triggered_by, TriggeredBy::Webhook);
    assert_eq!(record.status, ExecutionStatus::Success);
}

#[tokio::test]
async fn empty_graph_completes_with_no_results() {
    let engine = engine_with(|_| {});
    let record = engine.execute(&[], &[]).await;

    assert_eq!(record.status, ExecutionStatus::Success);
    assert!(record.node_results.is_empty());
}
