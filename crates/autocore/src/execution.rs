use crate::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle states for runs and individual nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Error,
    Cancelled,
}

/// What kicked off a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggeredBy {
    Manual,
    Webhook,
    Cron,
}

/// Outcome of executing a single node. Created exactly once per node
/// per run and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionResult {
    pub node_id: NodeId,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl NodeExecutionResult {
    pub fn success(node_id: NodeId, data: Value, started_at: DateTime<Utc>) -> Self {
        Self {
            node_id,
            status: ExecutionStatus::Success,
            data: Some(data),
            error: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failure(node_id: NodeId, error: String, started_at: DateTime<Utc>) -> Self {
        Self {
            node_id,
            status: ExecutionStatus::Error,
            data: None,
            error: Some(error),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Full outcome of one workflow run.
///
/// `node_results` is in completion order, not canvas order. A run with
/// failed nodes still finishes with `Success`; only structural failures
/// (a graph that cannot be scheduled) mark the whole run `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<Uuid>,
    pub status: ExecutionStatus,
    pub node_results: Vec<NodeExecutionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub triggered_by: TriggeredBy,
}

impl ExecutionRecord {
    pub fn start(workflow_id: Option<Uuid>, triggered_by: TriggeredBy) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            status: ExecutionStatus::Running,
            node_results: Vec::new(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
            triggered_by,
        }
    }

    /// Stamp the terminal status and completion time.
    pub fn finish(&mut self, status: ExecutionStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    pub fn result_for(&self, node_id: &str) -> Option<&NodeExecutionResult> {
        self.node_results.iter().find(|r| r.node_id == node_id)
    }
}
