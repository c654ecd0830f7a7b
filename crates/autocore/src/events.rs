use crate::{ExecutionStatus, NodeExecutionResult, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type ExecutionId = Uuid;

/// Events emitted while a workflow runs. One event per node completion
/// plus run-level bracketing, mirroring what a live canvas subscribes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExecutionEvent {
    #[serde(rename_all = "camelCase")]
    ExecutionStarted {
        execution_id: ExecutionId,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    NodeStarted {
        execution_id: ExecutionId,
        node_id: NodeId,
        node_type: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    NodeFinished {
        execution_id: ExecutionId,
        result: NodeExecutionResult,
    },
    #[serde(rename_all = "camelCase")]
    ExecutionFinished {
        execution_id: ExecutionId,
        status: ExecutionStatus,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for execution events.
///
/// Delivery is fire-and-forget: `emit` drops the event when nobody is
/// subscribed or a receiver lags, so a slow observer can never stall
/// the scheduler.
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }
}
