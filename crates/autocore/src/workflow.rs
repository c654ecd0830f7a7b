use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Node identifiers come from the canvas and are plain strings, unique
/// within one workflow.
pub type NodeId = String;

/// User-configurable parameters attached to a node (URLs, headers, ...).
pub type Parameters = serde_json::Map<String, Value>;

/// A single unit of work in the workflow graph.
///
/// The `type` field is the dispatch key the engine uses to pick a
/// `NodeExecutor`. Nodes are immutable once execution starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl WorkflowNode {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Directed dependency/data-flow link between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub source: NodeId,
    pub target: NodeId,
}

impl WorkflowEdge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Complete workflow definition as stored and shipped by the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    #[serde(default)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            active: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    pub fn connect(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        self.edges.push(WorkflowEdge::new(source, target));
    }

    pub fn find_node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
