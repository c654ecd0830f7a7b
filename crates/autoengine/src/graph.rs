use autocore::{GraphError, NodeId, WorkflowEdge, WorkflowNode};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};

/// Bidirectional adjacency index over a workflow graph.
///
/// Built once per run and immutable afterwards. Construction validates
/// the graph structurally: duplicate node ids, edges naming unknown
/// nodes, graphs with no entry point, and cycles are all rejected
/// before any node executes.
#[derive(Debug)]
pub struct AdjacencyIndex {
    incoming: HashMap<NodeId, HashSet<NodeId>>,
    outgoing: HashMap<NodeId, Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl AdjacencyIndex {
    pub fn build(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Result<Self, GraphError> {
        let mut incoming: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();
        let mut outgoing: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for node in nodes {
            if incoming.contains_key(&node.id) {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
            incoming.insert(node.id.clone(), HashSet::new());
            outgoing.insert(node.id.clone(), Vec::new());
        }

        for edge in edges {
            if !incoming.contains_key(&edge.source) {
                return Err(GraphError::UnknownNode(edge.source.clone()));
            }
            if !incoming.contains_key(&edge.target) {
                return Err(GraphError::UnknownNode(edge.target.clone()));
            }
            // Parallel edges collapse to one dependency.
            let targets = outgoing.get_mut(&edge.source).unwrap();
            if !targets.contains(&edge.target) {
                targets.push(edge.target.clone());
                incoming
                    .get_mut(&edge.target)
                    .unwrap()
                    .insert(edge.source.clone());
            }
        }

        // Roots in node-list order keeps traversal deterministic.
        let roots: Vec<NodeId> = nodes
            .iter()
            .filter(|n| incoming[&n.id].is_empty())
            .map(|n| n.id.clone())
            .collect();

        if roots.is_empty() && !nodes.is_empty() {
            return Err(GraphError::NoStartingNode);
        }

        Self::check_acyclic(nodes, edges)?;

        Ok(Self {
            incoming,
            outgoing,
            roots,
        })
    }

    /// Reject cycles reachable from a valid root set; without this the
    /// scheduler would leave the cycle members waiting forever.
    fn check_acyclic(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Result<(), GraphError> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut index_of = HashMap::new();

        for node in nodes {
            let idx = graph.add_node(node.id.as_str());
            index_of.insert(node.id.as_str(), idx);
        }
        for edge in edges {
            graph.add_edge(index_of[edge.source.as_str()], index_of[edge.target.as_str()], ());
        }

        if toposort(&graph, None).is_err() {
            return Err(GraphError::CycleDetected);
        }
        Ok(())
    }

    /// Nodes with no incoming edges, in node-list order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn successors(&self, id: &str) -> &[NodeId] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: &str) -> Option<&HashSet<NodeId>> {
        self.incoming.get(id)
    }

    /// Remaining-dependency counts used by the scheduler.
    pub fn in_degrees(&self) -> HashMap<NodeId, usize> {
        self.incoming
            .iter()
            .map(|(id, deps)| (id.clone(), deps.len()))
            .collect()
    }
}
