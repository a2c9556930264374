use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Read-only directed graph consumed by the level assigner.
///
/// `vertices()` must yield every node exactly once and in a stable order: the
/// assigner uses that order to break ties, so two runs over the same view
/// produce the same layering.
pub trait GraphView {
    type Node: Copy + Eq + Hash + Debug;
    type Edge: Copy;

    fn vertices(&self) -> impl Iterator<Item = Self::Node> + '_;
    fn out_edges(&self, node: Self::Node) -> impl Iterator<Item = Self::Edge> + '_;
    fn in_edges(&self, node: Self::Node) -> impl Iterator<Item = Self::Edge> + '_;
    fn source(&self, edge: Self::Edge) -> Self::Node;
    fn dest(&self, edge: Self::Edge) -> Self::Node;

    fn in_degree(&self, node: Self::Node) -> usize {
        self.in_edges(node).count()
    }

    fn out_degree(&self, node: Self::Node) -> usize {
        self.out_edges(node).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Arena-backed directed multigraph. Node payloads are deduplicated by value.
#[derive(Debug, Clone)]
pub struct DiGraph<N> {
    nodes: Vec<N>,
    index: HashMap<N, NodeId>,
    edges: Vec<(NodeId, NodeId)>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl<N> Default for DiGraph<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> DiGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an edge list; endpoints are added in first-seen order.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    /// Insert `node` unless an equal payload is already present.
    pub fn add_node(&mut self, node: N) -> NodeId {
        if let Some(&id) = self.index.get(&node) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.index.insert(node.clone(), id);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    pub fn add_edge(&mut self, from: N, to: N) -> EdgeId {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.connect(from, to)
    }

    /// Add an edge between two existing nodes.
    ///
    /// Panics if either id does not belong to this graph.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> EdgeId {
        assert!(
            from.0 < self.nodes.len() && to.0 < self.nodes.len(),
            "edge {:?} -> {:?} references a node outside the graph",
            from,
            to
        );
        let id = EdgeId(self.edges.len());
        self.edges.push((from, to));
        self.outgoing[from.0].push(id);
        self.incoming[to.0].push(id);
        id
    }

    pub fn node_id(&self, node: &N) -> Option<NodeId> {
        self.index.get(node).copied()
    }

    /// Copy of this graph with every edge flipped; node order is preserved.
    pub fn reversed(&self) -> Self {
        let mut graph = Self::new();
        for node in &self.nodes {
            graph.add_node(node.clone());
        }
        for &(from, to) in &self.edges {
            graph.connect(to, from);
        }
        graph
    }
}

impl<N> DiGraph<N> {
    pub fn node(&self, id: NodeId) -> &N {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }
}

impl<N> GraphView for DiGraph<N> {
    type Node = NodeId;
    type Edge = EdgeId;

    fn vertices(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.outgoing[node.0].iter().copied()
    }

    fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.incoming[node.0].iter().copied()
    }

    fn source(&self, edge: EdgeId) -> NodeId {
        self.edges[edge.0].0
    }

    fn dest(&self, edge: EdgeId) -> NodeId {
        self.edges[edge.0].1
    }

    fn in_degree(&self, node: NodeId) -> usize {
        self.incoming[node.0].len()
    }

    fn out_degree(&self, node: NodeId) -> usize {
        self.outgoing[node.0].len()
    }
}

/// A view of `G` with every edge direction swapped.
#[derive(Debug, Clone, Copy)]
pub struct Transposed<'a, G>(pub &'a G);

impl<G: GraphView> GraphView for Transposed<'_, G> {
    type Node = G::Node;
    type Edge = G::Edge;

    fn vertices(&self) -> impl Iterator<Item = G::Node> + '_ {
        self.0.vertices()
    }

    fn out_edges(&self, node: G::Node) -> impl Iterator<Item = G::Edge> + '_ {
        self.0.in_edges(node)
    }

    fn in_edges(&self, node: G::Node) -> impl Iterator<Item = G::Edge> + '_ {
        self.0.out_edges(node)
    }

    fn source(&self, edge: G::Edge) -> G::Node {
        self.0.dest(edge)
    }

    fn dest(&self, edge: G::Edge) -> G::Node {
        self.0.source(edge)
    }

    fn in_degree(&self, node: G::Node) -> usize {
        self.0.out_degree(node)
    }

    fn out_degree(&self, node: G::Node) -> usize {
        self.0.in_degree(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_is_idempotent() {
        let mut g: DiGraph<&str> = DiGraph::new();
        let a = g.add_node("a");
        assert_eq!(g.add_node("a"), a);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn parallel_edges_count_separately() {
        let g = DiGraph::from_edges([("a", "b"), ("a", "b")]);
        let a = g.node_id(&"a").unwrap();
        let b = g.node_id(&"b").unwrap();
        assert_eq!(g.out_degree(a), 2);
        assert_eq!(g.in_degree(b), 2);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn transposed_swaps_every_direction() {
        let g = DiGraph::from_edges([("a", "b")]);
        let a = g.node_id(&"a").unwrap();
        let b = g.node_id(&"b").unwrap();
        let t = Transposed(&g);

        assert_eq!(t.in_degree(a), 1);
        assert_eq!(t.out_degree(a), 0);
        assert_eq!(t.out_degree(b), 1);

        let edge = t.out_edges(b).next().unwrap();
        assert_eq!(t.source(edge), b);
        assert_eq!(t.dest(edge), a);
        assert_eq!(t.in_edges(a).count(), 1);
    }

    #[test]
    fn reversed_keeps_node_order() {
        let g = DiGraph::from_edges([("x", "y"), ("y", "z")]);
        let r = g.reversed();
        let names: Vec<_> = r.vertices().map(|id| *r.node(id)).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        let y = r.node_id(&"y").unwrap();
        let edge = r.out_edges(y).next().unwrap();
        assert_eq!(*r.node(r.dest(edge)), "x");
    }

    #[test]
    #[should_panic(expected = "outside the graph")]
    fn connect_rejects_foreign_ids() {
        let mut g: DiGraph<&str> = DiGraph::new();
        let a = g.add_node("a");
        g.connect(a, NodeId(7));
    }
}
