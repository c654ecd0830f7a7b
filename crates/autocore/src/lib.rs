//! Core types for the workflow automation engine
//!
//! This crate defines the workflow model, execution records, the error
//! taxonomy, and the execution event bus. It contains no scheduling
//! logic; that lives in `autoengine`.

mod error;
mod events;
mod execution;
mod workflow;

pub use error::{EngineError, GraphError, NodeError};
pub use events::{EventBus, ExecutionEvent, ExecutionId};
pub use execution::{ExecutionRecord, ExecutionStatus, NodeExecutionResult, TriggeredBy};
pub use workflow::{NodeId, Parameters, Workflow, WorkflowEdge, WorkflowNode};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
