use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Immutable outcome of a level assignment run.
#[derive(Debug, Clone)]
pub struct LayoutResult<N> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    levels: Vec<usize>,
    group_of: Vec<Option<usize>>,
    groups: Vec<Vec<N>>,
    nodes_per_level: Vec<usize>,
    isolated: HashSet<N>,
}

impl<N: Copy + Eq + Hash> LayoutResult<N> {
    /// `groups` holds vertex indices of each cycle group; `isolated` flags
    /// nodes with no edges at all.
    pub(crate) fn new(
        nodes: Vec<N>,
        levels: Vec<usize>,
        groups: Vec<Vec<usize>>,
        isolated: &[bool],
    ) -> Self {
        debug_assert_eq!(nodes.len(), levels.len());

        let index = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let level_count = levels.iter().max().map_or(0, |max| max + 1);
        let mut nodes_per_level = vec![0; level_count];
        for &level in &levels {
            nodes_per_level[level] += 1;
        }

        let mut group_of = vec![None; nodes.len()];
        for (g, members) in groups.iter().enumerate() {
            for &m in members {
                group_of[m] = Some(g);
            }
        }
        let groups = groups
            .into_iter()
            .map(|members| members.into_iter().map(|m| nodes[m]).collect())
            .collect();

        let isolated = nodes
            .iter()
            .zip(isolated)
            .filter(|(_, iso)| **iso)
            .map(|(&n, _)| n)
            .collect();

        Self {
            nodes,
            index,
            levels,
            group_of,
            groups,
            nodes_per_level,
            isolated,
        }
    }

    /// Level of `node`, or `None` if it was not part of the input graph.
    pub fn level_of(&self, node: &N) -> Option<usize> {
        self.index.get(node).map(|&i| self.levels[i])
    }

    pub fn number_of_levels(&self) -> usize {
        self.nodes_per_level.len()
    }

    /// Node count per level, indexed by level.
    pub fn nodes_per_level(&self) -> &[usize] {
        &self.nodes_per_level
    }

    pub fn isolated_nodes(&self) -> &HashSet<N> {
        &self.isolated
    }

    pub fn is_isolated(&self, node: &N) -> bool {
        self.isolated.contains(node)
    }

    /// Strongly connected components of two or more nodes, plus single nodes
    /// carrying a self-loop. Ordered by their first member in vertex order.
    pub fn cycle_groups(&self) -> &[Vec<N>] {
        &self.groups
    }

    /// Whether `a` and `b` are the same node or belong to one cycle group.
    pub fn same_group(&self, a: &N, b: &N) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&i), Some(&j)) => {
                i == j || (self.group_of[i].is_some() && self.group_of[i] == self.group_of[j])
            }
            _ => false,
        }
    }

    /// Nodes bucketed by level, each bucket in vertex order.
    pub fn layers(&self) -> Vec<Vec<N>> {
        let mut layers: Vec<Vec<N>> = self
            .nodes_per_level
            .iter()
            .map(|&count| Vec::with_capacity(count))
            .collect();
        for (&node, &level) in self.nodes.iter().zip(&self.levels) {
            layers[level].push(node);
        }
        layers
    }

    /// `(node, level)` pairs in vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (N, usize)> + '_ {
        self.nodes.iter().copied().zip(self.levels.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<N: PartialEq> PartialEq for LayoutResult<N> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.levels == other.levels
            && self.groups == other.groups
            && self.nodes_per_level == other.nodes_per_level
    }
}
