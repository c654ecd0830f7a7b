use autocore::{
    ExecutionRecord, ExecutionStatus, NodeExecutionResult, TriggeredBy, WorkflowEdge, WorkflowNode,
};
use chrono::Utc;
use serde_json::json;

#[test]
fn node_deserializes_from_canvas_json() {
    // Extra canvas fields (position, labels) are ignored.
    let node: WorkflowNode = serde_json::from_value(json!({
        "id": "node-1",
        "type": "httpRequest",
        "parameters": {"url": "https://example.com", "method": "POST"},
        "position": {"x": 100, "y": 200}
    }))
    .unwrap();

    assert_eq!(node.id, "node-1");
    assert_eq!(node.node_type, "httpRequest");
    assert_eq!(node.parameters["url"], json!("https://example.com"));
}

#[test]
fn node_parameters_default_to_empty() {
    let node: WorkflowNode =
        serde_json::from_value(json!({"id": "n", "type": "start"})).unwrap();
    assert!(node.parameters.is_empty());
}

#[test]
fn edge_round_trips() {
    let edge: WorkflowEdge =
        serde_json::from_value(json!({"source": "a", "target": "b"})).unwrap();
    assert_eq!(edge.source, "a");
    assert_eq!(edge.target, "b");
}

#[test]
fn node_result_serializes_camel_case() {
    let result = NodeExecutionResult::success("node-1".to_string(), json!({"x": 1}), Utc::now());
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["nodeId"], json!("node-1"));
    assert_eq!(value["status"], json!("success"));
    assert_eq!(value["data"], json!({"x": 1}));
    assert!(value.get("error").is_none(), "error is omitted on success");
    assert!(value.get("startedAt").is_some());
    assert!(value.get("finishedAt").is_some());
}

#[test]
fn failed_node_result_carries_the_message() {
    let result =
        NodeExecutionResult::failure("node-1".to_string(), "boom".to_string(), Utc::now());
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["status"], json!("error"));
    assert_eq!(value["error"], json!("boom"));
    assert!(value.get("data").is_none());
}

#[test]
fn execution_record_lifecycle() {
    let mut record = ExecutionRecord::start(None, TriggeredBy::Manual);
    assert_eq!(record.status, ExecutionStatus::Running);
    assert!(record.finished_at.is_none());

    record.finish(ExecutionStatus::Success);
    assert_eq!(record.status, ExecutionStatus::Success);
    assert!(record.finished_at.is_some());

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["status"], json!("success"));
    assert_eq!(value["triggeredBy"], json!("manual"));
    assert!(value.get("workflowId").is_none());
}
