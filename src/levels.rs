use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::condense;
use crate::graph::{GraphView, Transposed};
use crate::options::{Direction, LevelOptions, Strategy};
use crate::queue::BucketQueue;
use crate::result::LayoutResult;

/// Index-based snapshot of a [`GraphView`], taken once per run.
///
/// Node `i` is the `i`-th vertex yielded by `vertices()`. Parallel edges appear
/// once per edge in `succ`/`pred`.
#[derive(Debug)]
pub(crate) struct Adjacency<N> {
    pub nodes: Vec<N>,
    pub succ: Vec<Vec<usize>>,
    pub pred: Vec<Vec<usize>>,
    pub isolated: Vec<bool>,
    /// Lowest level a connected node may take.
    pub base: usize,
}

impl<N: Copy + Eq + Hash + Debug> Adjacency<N> {
    /// Panics if the view lists a vertex twice or an edge touches a node that
    /// `vertices()` did not yield.
    pub fn build<G: GraphView<Node = N>>(graph: &G) -> Self {
        let nodes: Vec<N> = graph.vertices().collect();
        let mut index: HashMap<N, usize> = HashMap::with_capacity(nodes.len());
        for (i, &node) in nodes.iter().enumerate() {
            assert!(
                index.insert(node, i).is_none(),
                "vertex {:?} is listed more than once",
                node
            );
        }
        let lookup = |node: N| -> usize {
            match index.get(&node) {
                Some(&i) => i,
                None => panic!("edge endpoint {:?} is not a vertex of the graph", node),
            }
        };

        let mut succ = vec![Vec::new(); nodes.len()];
        let mut pred = vec![Vec::new(); nodes.len()];
        let mut isolated = vec![false; nodes.len()];

        for (i, &node) in nodes.iter().enumerate() {
            for edge in graph.out_edges(node) {
                assert_eq!(graph.source(edge), node, "out-edge of {:?} has another source", node);
                succ[i].push(lookup(graph.dest(edge)));
            }
            for edge in graph.in_edges(node) {
                assert_eq!(graph.dest(edge), node, "in-edge of {:?} has another destination", node);
                pred[i].push(lookup(graph.source(edge)));
            }
            assert_eq!(
                graph.in_degree(node),
                pred[i].len(),
                "in-degree of {:?} disagrees with its in-edges",
                node
            );
            isolated[i] = graph.in_degree(node) == 0 && graph.out_degree(node) == 0;
        }

        let base = usize::from(isolated.iter().any(|&iso| iso));

        Self {
            nodes,
            succ,
            pred,
            isolated,
            base,
        }
    }
}

impl<N> Adjacency<N> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_self_loop(&self, node: usize) -> bool {
        self.succ[node].contains(&node)
    }

    /// Keep groups that are real cycles, sorted by first member.
    pub fn cycle_groups(&self, groups: impl IntoIterator<Item = Vec<usize>>) -> Vec<Vec<usize>> {
        let mut cycles: Vec<Vec<usize>> = groups
            .into_iter()
            .filter(|members| members.len() > 1 || members.iter().any(|&m| self.has_self_loop(m)))
            .map(|mut members| {
                members.sort_unstable();
                members
            })
            .collect();
        cycles.sort_unstable_by_key(|members| members[0]);
        cycles
    }
}

/// Assigns every node of a graph to a level.
///
/// For an edge `u -> v` outside a cycle group, `level(u) < level(v)`; the
/// members of a cycle group share one level. Nodes without any edge sit on
/// level 0 and, when present, push everything else to level 1 and above.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelAssigner {
    options: LevelOptions,
}

impl LevelAssigner {
    pub fn new(options: LevelOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> LevelOptions {
        self.options
    }

    pub fn run<G: GraphView>(&self, graph: &G) -> LayoutResult<G::Node> {
        match self.options.direction {
            Direction::Forward => self.run_directed(graph),
            Direction::Reverse => self.run_directed(&Transposed(graph)),
        }
    }

    fn run_directed<G: GraphView>(&self, graph: &G) -> LayoutResult<G::Node> {
        let adjacency = Adjacency::build(graph);
        debug!(
            nodes = adjacency.len(),
            base = adjacency.base,
            strategy = ?self.options.strategy,
            "assigning levels"
        );

        let (levels, groups) = match self.options.strategy {
            Strategy::Incremental => Incremental::new(&adjacency).run(),
            Strategy::Condensation => condense::assign(&adjacency),
        };

        LayoutResult::new(adjacency.nodes, levels, groups, &adjacency.isolated)
    }
}

/// Levels ranked from sources, using the default strategy.
pub fn assign_levels<G: GraphView>(graph: &G) -> LayoutResult<G::Node> {
    LevelAssigner::default().run(graph)
}

/// Levels ranked from sinks: the same algorithm on the transposed view.
pub fn assign_levels_reversed<G: GraphView>(graph: &G) -> LayoutResult<G::Node> {
    LevelAssigner::new(LevelOptions::default().reversed()).run(graph)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Plain(usize),
    Group(usize),
}

#[derive(Debug)]
struct Group {
    members: Vec<usize>,
    level: usize,
    /// Incoming edges from unfinalized nodes outside the group.
    pending: usize,
}

/// Kahn-style propagation that collapses a cycle group whenever the cheapest
/// queued node still waits on predecessors.
struct Incremental<'a, N> {
    adjacency: &'a Adjacency<N>,
    level: Vec<usize>,
    pending: Vec<usize>,
    finalized: Vec<bool>,
    group_of: Vec<Option<usize>>,
    groups: Vec<Group>,
    queue: BucketQueue,
    ready: Vec<Unit>,
}

impl<'a, N> Incremental<'a, N> {
    fn new(adjacency: &'a Adjacency<N>) -> Self {
        let n = adjacency.nodes.len();
        let mut level = vec![0; n];
        let mut pending = vec![0; n];
        let mut queue = BucketQueue::with_capacity(n);

        for node in 0..n {
            if adjacency.isolated[node] {
                continue;
            }
            level[node] = adjacency.base;
            pending[node] = adjacency.pred[node].len();
            queue.set(node, pending[node]);
        }

        Self {
            adjacency,
            level,
            pending,
            finalized: vec![false; n],
            group_of: vec![None; n],
            groups: Vec::new(),
            queue,
            ready: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<usize>, Vec<Vec<usize>>) {
        while let Some((node, count)) = self.queue.pop_min() {
            if count == 0 {
                self.settle(Unit::Plain(node));
            } else {
                self.collapse(node);
            }
        }

        debug_assert!(
            (0..self.level.len()).all(|n| self.finalized[n] || self.adjacency.isolated[n]),
            "queue drained with unfinalized nodes"
        );

        let adjacency = self.adjacency;
        let groups = adjacency.cycle_groups(self.groups.into_iter().map(|g| g.members));
        (self.level, groups)
    }

    /// Finalize `unit` and everything its finalization unblocks.
    fn settle(&mut self, unit: Unit) {
        self.ready.push(unit);
        while let Some(unit) = self.ready.pop() {
            self.finalize(unit);
        }
    }

    fn finalize(&mut self, unit: Unit) {
        let adjacency = self.adjacency;
        match unit {
            Unit::Plain(node) => {
                self.finalized[node] = true;
                let level = self.level[node];
                trace!(node, level, "finalized");
                for &next in &adjacency.succ[node] {
                    self.relax(next, level);
                }
            }
            Unit::Group(group) => {
                let members = std::mem::take(&mut self.groups[group].members);
                let level = self.groups[group].level;
                for &member in &members {
                    self.finalized[member] = true;
                }
                trace!(group, level, size = members.len(), "finalized group");
                for &member in &members {
                    for &next in &adjacency.succ[member] {
                        if self.group_of[next] != Some(group) {
                            self.relax(next, level);
                        }
                    }
                }
                self.groups[group].members = members;
            }
        }
    }

    /// One incoming edge of `target` now comes from a finalized source.
    fn relax(&mut self, target: usize, source_level: usize) {
        let candidate = source_level + 1;
        match self.group_of[target] {
            Some(index) => {
                let group = &mut self.groups[index];
                assert!(group.pending > 0, "group {} relaxed past zero", index);
                group.pending -= 1;
                if candidate > group.level {
                    group.level = candidate;
                    for &member in &group.members {
                        self.level[member] = candidate;
                    }
                }
                if group.pending == 0 {
                    self.ready.push(Unit::Group(index));
                }
            }
            None => {
                assert!(self.pending[target] > 0, "node {} relaxed past zero", target);
                debug_assert!(self.queue.contains(target));
                self.level[target] = self.level[target].max(candidate);
                self.pending[target] -= 1;
                self.queue.set(target, self.pending[target]);
            }
        }
    }

    /// `node` still has unresolved predecessors: merge it with every node it
    /// can both reach and be reached from.
    fn collapse(&mut self, node: usize) {
        let adjacency = self.adjacency;
        let forward = reachable(&adjacency.succ, node);
        let backward = reachable(&adjacency.pred, node);
        let members: Vec<usize> = (0..adjacency.len())
            .filter(|&m| m == node || (forward[m] && backward[m]))
            .collect();

        let index = self.groups.len();
        let mut level = 0;
        for &member in &members {
            debug_assert!(!self.finalized[member] && self.group_of[member].is_none());
            self.group_of[member] = Some(index);
            self.queue.remove(member);
            level = level.max(self.level[member]);
        }
        for &member in &members {
            self.level[member] = level;
        }

        let pending = members
            .iter()
            .flat_map(|&member| &adjacency.pred[member])
            .filter(|&&p| !self.finalized[p] && self.group_of[p] != Some(index))
            .count();

        debug!(
            group = index,
            size = members.len(),
            level,
            pending,
            remaining = self.queue.len(),
            "collapsed cycle group"
        );

        self.groups.push(Group {
            members,
            level,
            pending,
        });
        if pending == 0 {
            self.settle(Unit::Group(index));
        }
    }
}

/// Nodes reachable from `start` over at least one edge. `start` itself is
/// marked only if it lies on a cycle.
fn reachable(adjacent: &[Vec<usize>], start: usize) -> Vec<bool> {
    let mut seen = vec![false; adjacent.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        for &next in &adjacent[node] {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }

    seen
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::graph::{DiGraph, NodeId};
    use proptest::prelude::{prop, prop_assert_eq, proptest};
    use proptest::strategy::Strategy as _;

    fn arb_graph() -> impl proptest::strategy::Strategy<Value = DiGraph<usize>> {
        (1usize..10).prop_flat_map(|n| {
            prop::collection::vec((0..n, 0..n), 0..(n * 3)).prop_map(move |edges| {
                let mut g = DiGraph::new();
                for v in 0..n {
                    g.add_node(v);
                }
                for (from, to) in edges {
                    g.add_edge(from, to);
                }
                g
            })
        })
    }

    /// Transitive closure over at least one edge.
    fn closure(g: &DiGraph<usize>) -> Vec<Vec<bool>> {
        let n = g.node_count();
        let mut reach = vec![vec![false; n]; n];
        for (from, to) in g.edges() {
            reach[from.0][to.0] = true;
        }
        for k in 0..n {
            for i in 0..n {
                if reach[i][k] {
                    for j in 0..n {
                        if reach[k][j] {
                            reach[i][j] = true;
                        }
                    }
                }
            }
        }
        reach
    }

    fn check_invariants(g: &DiGraph<usize>, result: &LayoutResult<NodeId>) {
        let reach = closure(g);
        let together = |u: NodeId, v: NodeId| u == v || (reach[u.0][v.0] && reach[v.0][u.0]);

        for (u, v) in g.edges() {
            let (lu, lv) = (result.level_of(&u).unwrap(), result.level_of(&v).unwrap());
            if together(u, v) {
                assert_eq!(lu, lv, "edge {:?}->{:?} inside a group", u, v);
                assert!(result.same_group(&u, &v));
            } else {
                assert!(lu < lv, "edge {:?}->{:?} across groups", u, v);
            }
        }

        let any_isolated = g.vertices().any(|v| g.in_degree(v) == 0 && g.out_degree(v) == 0);
        for v in g.vertices() {
            let isolated = g.in_degree(v) == 0 && g.out_degree(v) == 0;
            let level = result.level_of(&v).unwrap();
            assert_eq!(result.is_isolated(&v), isolated);
            if isolated {
                assert_eq!(level, 0);
            } else if any_isolated {
                assert!(level >= 1);
            }
            assert!(level < result.number_of_levels());
        }

        assert_eq!(result.nodes_per_level().iter().sum::<usize>(), g.node_count());
    }

    proptest! {
        #[test]
        fn incremental_layering_holds_invariants(g in arb_graph()) {
            check_invariants(&g, &assign_levels(&g));
        }

        #[test]
        fn strategies_agree(g in arb_graph()) {
            let condensed = LevelAssigner::new(
                LevelOptions::default().with_strategy(Strategy::Condensation),
            )
            .run(&g);
            check_invariants(&g, &condensed);
            prop_assert_eq!(assign_levels(&g), condensed);
        }

        #[test]
        fn reverse_matches_flipped_graph(g in arb_graph()) {
            let reversed = assign_levels_reversed(&g);
            check_invariants(&g.reversed(), &reversed);
            prop_assert_eq!(reversed, assign_levels(&g.reversed()));
        }
    }
}
