use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Structural problems with the workflow graph. Raised before any node
/// executes; they abort the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("No starting node found in workflow")]
    NoStartingNode,

    #[error("Cycle detected in workflow graph")]
    CycleDetected,

    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("Edge references unknown node: {0}")]
    UnknownNode(String),
}

/// Failures inside a single node's executor. Caught by the scheduler
/// and recorded against that node; they never abort the run.
#[derive(Error, Debug, Clone)]
pub enum NodeError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("Cancelled")]
    Cancelled,
}
