//! Up-front cycle collapsing: strongly connected components are found once
//! with Tarjan's algorithm and levels follow the longest path through the
//! resulting DAG of components.

use tracing::debug;

use crate::levels::Adjacency;

pub(crate) fn assign<N>(adjacency: &Adjacency<N>) -> (Vec<usize>, Vec<Vec<usize>>) {
    let components = strongly_connected(&adjacency.succ);
    debug!(components = components.len(), "condensed graph");

    let mut component_of = vec![0; adjacency.len()];
    for (c, members) in components.iter().enumerate() {
        for &m in members {
            component_of[m] = c;
        }
    }

    // Tarjan emits a component only after everything it reaches, so walking
    // the list backwards visits predecessors first.
    let mut component_level = vec![adjacency.base; components.len()];
    for c in (0..components.len()).rev() {
        let level = components[c]
            .iter()
            .flat_map(|&m| &adjacency.pred[m])
            .map(|&p| component_of[p])
            .filter(|&pc| pc != c)
            .map(|pc| component_level[pc] + 1)
            .fold(adjacency.base, usize::max);
        component_level[c] = level;
    }

    let levels = (0..adjacency.len())
        .map(|node| {
            if adjacency.isolated[node] {
                0
            } else {
                component_level[component_of[node]]
            }
        })
        .collect();

    (levels, adjacency.cycle_groups(components))
}

/// Iterative Tarjan. Components come out in reverse topological order.
fn strongly_connected(succ: &[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = succ.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut next_index = 0;
    // (node, position of the next successor to look at)
    let mut calls: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        calls.push((root, 0));

        while let Some(frame) = calls.last_mut() {
            let (node, pos) = *frame;
            if let Some(&next) = succ[node].get(pos) {
                frame.1 += 1;
                if index[next] == UNVISITED {
                    index[next] = next_index;
                    lowlink[next] = next_index;
                    next_index += 1;
                    stack.push(next);
                    on_stack[next] = true;
                    calls.push((next, 0));
                } else if on_stack[next] {
                    lowlink[node] = lowlink[node].min(index[next]);
                }
                continue;
            }

            calls.pop();
            if let Some(&(parent, _)) = calls.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[node]);
            }

            if lowlink[node] == index[node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::strongly_connected;

    #[test]
    fn finds_cycles_and_singletons() {
        // 0 <-> 1 -> 2 -> 3 -> 2, 4 alone
        let succ = vec![vec![1], vec![0, 2], vec![3], vec![2], vec![]];
        let mut components = strongly_connected(&succ);
        components.sort();
        assert_eq!(components, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn sinks_come_first() {
        let succ = vec![vec![1], vec![2], vec![]];
        assert_eq!(strongly_connected(&succ), vec![vec![2], vec![1], vec![0]]);
    }

    #[test]
    fn self_loop_stays_a_singleton() {
        let succ = vec![vec![0, 1], vec![]];
        assert_eq!(strongly_connected(&succ), vec![vec![1], vec![0]]);
    }
}
