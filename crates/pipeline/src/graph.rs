//! Agent roles and the hand-off dependency graph.
//!
//! The graph records the declared hand-off order between the five fixed agent
//! roles. It is bookkeeping: the pipeline's real execution order is the
//! explicit list in [`crate::step::StepName::SEQUENCE`], and no component ever
//! traverses this graph to schedule work. The two constructs are kept
//! deliberately independent; the graph's only consumers are the state
//! snapshot and the final export.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Agent roles
// ---------------------------------------------------------------------------

/// One of the five fixed agent roles.
///
/// Serializes as the bare role name, which also makes it usable as a JSON map
/// key in the agent status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentName {
    Coordinator,
    Digger,
    Proofmaster,
    Adapter,
    Graphmaster,
}

impl AgentName {
    /// All five roles, in hand-off order.
    pub const ALL: [AgentName; 5] = [
        AgentName::Coordinator,
        AgentName::Digger,
        AgentName::Proofmaster,
        AgentName::Adapter,
        AgentName::Graphmaster,
    ];

    /// Returns the role name.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentName::Coordinator => "Coordinator",
            AgentName::Digger => "Digger",
            AgentName::Proofmaster => "Proofmaster",
            AgentName::Adapter => "Adapter",
            AgentName::Graphmaster => "Graphmaster",
        }
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four fixed hand-off edges: a path ending at Graphmaster, which has no
/// outgoing edge.
pub const HANDOFFS: [(AgentName, AgentName); 4] = [
    (AgentName::Coordinator, AgentName::Digger),
    (AgentName::Digger, AgentName::Proofmaster),
    (AgentName::Proofmaster, AgentName::Adapter),
    (AgentName::Adapter, AgentName::Graphmaster),
];

// ---------------------------------------------------------------------------
// Dependency graph
// ---------------------------------------------------------------------------

/// Directed graph over agent roles.
///
/// Node and edge insertion is idempotent (set semantics with insertion order
/// kept), so repeated installation of the fixed topology leaves the graph
/// unchanged in value. For this system the graph is always the five-node,
/// four-edge hand-off path and therefore always acyclic.
///
/// Serializes as `{"nodes": [...], "edges": [{"source", "target"}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    nodes: Vec<AgentName>,
    edges: Vec<(AgentName, AgentName)>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; a node already present is left untouched.
    pub fn add_node(&mut self, node: AgentName) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    /// Adds a directed edge, inserting both endpoints as nodes if missing.
    /// An edge already present is left untouched.
    pub fn add_edge(&mut self, source: AgentName, target: AgentName) {
        self.add_node(source);
        self.add_node(target);
        if !self.edges.contains(&(source, target)) {
            self.edges.push((source, target));
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[AgentName] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[(AgentName, AgentName)] {
        &self.edges
    }

    /// Returns `true` if the graph contains no directed cycle.
    ///
    /// Depth-first search with three-colour marking; a back edge to a node on
    /// the current path is a cycle. The graph is bounded at five nodes, so
    /// recursion depth is not a concern.
    pub fn is_acyclic(&self) -> bool {
        // 0 = unvisited, 1 = on the current path, 2 = done.
        fn visit(node: usize, adjacency: &[Vec<usize>], marks: &mut [u8]) -> bool {
            marks[node] = 1;
            for &next in &adjacency[node] {
                match marks[next] {
                    1 => return false,
                    0 => {
                        if !visit(next, adjacency, marks) {
                            return false;
                        }
                    }
                    _ => {}
                }
            }
            marks[node] = 2;
            true
        }

        let index = |name: AgentName| {
            self.nodes
                .iter()
                .position(|&candidate| candidate == name)
                .unwrap_or_default()
        };
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for &(source, target) in &self.edges {
            adjacency[index(source)].push(index(target));
        }

        let mut marks = vec![0u8; self.nodes.len()];
        (0..self.nodes.len()).all(|node| marks[node] != 0 || visit(node, &adjacency, &mut marks))
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Edge {
            source: AgentName,
            target: AgentName,
        }

        let edges: Vec<Edge> = self
            .edges
            .iter()
            .map(|&(source, target)| Edge { source, target })
            .collect();

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("nodes", &self.nodes)?;
        map.serialize_entry("edges", &edges)?;
        map.end()
    }
}

/// Builds the fixed hand-off topology into `graph`. Idempotent.
pub fn install_handoffs(graph: &mut DependencyGraph) {
    for node in AgentName::ALL {
        graph.add_node(node);
    }
    for (source, target) in HANDOFFS {
        graph.add_edge(source, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        install_handoffs(&mut graph);
        graph
    }

    #[test]
    fn fixed_topology_has_five_nodes_and_four_edges() {
        let graph = fixed();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.is_acyclic());
    }

    #[test]
    fn installation_is_idempotent() {
        let mut graph = fixed();
        let before = graph.clone();
        install_handoffs(&mut graph);
        assert_eq!(graph, before);
    }

    #[test]
    fn graphmaster_has_no_outgoing_edge() {
        let graph = fixed();
        assert!(graph
            .edges()
            .iter()
            .all(|&(source, _)| source != AgentName::Graphmaster));
    }

    #[test]
    fn cycle_is_detected() {
        let mut graph = fixed();
        graph.add_edge(AgentName::Graphmaster, AgentName::Coordinator);
        assert!(!graph.is_acyclic());
    }

    #[test]
    fn serializes_as_node_edge_lists() {
        let value = serde_json::to_value(fixed()).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 5);
        assert_eq!(value["edges"].as_array().unwrap().len(), 4);
        assert_eq!(value["edges"][0]["source"], "Coordinator");
        assert_eq!(value["edges"][0]["target"], "Digger");
    }
}
