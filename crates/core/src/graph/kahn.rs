//! Kahn's algorithm over caller-supplied dependency nodes.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

/// A node that can be ordered by [`kahn_sort`].
///
/// `dependencies` must precede the node, `dependents` must follow it. Both
/// relations are expressed through keys; keys that do not belong to any
/// node in the input are still counted as dependencies but never resolved.
pub trait DependencyNode {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;

    fn dependencies(&self) -> &[Self::Key];

    fn dependents(&self) -> &[Self::Key];
}

/// Nodes that could not be ordered because they sit on (or behind) a cycle.
#[derive(Debug)]
pub struct CycleError<N> {
    /// The nodes that were ordered, in the order they were emitted.
    pub sorted: Vec<N>,
    /// The nodes left behind, in their input relative order.
    pub unorderable: Vec<N>,
    pub total: usize,
}

impl<N> fmt::Display for CycleError<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependency cycle detected: {} of {} nodes unorderable", self.unorderable.len(), self.total)
    }
}

impl<N: fmt::Debug> std::error::Error for CycleError<N> {}

/// Order `nodes` so that every node comes after all of its dependencies.
///
/// When no node has dependencies the input is returned unchanged, even when
/// `descending` is set. Nodes on a cycle never reach in-degree zero and are
/// dropped from the output; use [`try_kahn_sort`] to detect that.
pub fn kahn_sort<N: DependencyNode>(nodes: Vec<N>, descending: bool) -> Vec<N> {
    let (sorted, unorderable) = sort_inner(nodes, descending);
    if !unorderable.is_empty() {
        tracing::debug!(dropped = unorderable.len(), "topological sort dropped nodes on a dependency cycle");
    }
    sorted
}

/// Like [`kahn_sort`], but reports unorderable nodes instead of dropping them.
pub fn try_kahn_sort<N: DependencyNode>(nodes: Vec<N>, descending: bool) -> Result<Vec<N>, CycleError<N>> {
    let total = nodes.len();
    let (sorted, unorderable) = sort_inner(nodes, descending);
    if unorderable.is_empty() { Ok(sorted) } else { Err(CycleError { sorted, unorderable, total }) }
}

fn sort_inner<N: DependencyNode>(nodes: Vec<N>, descending: bool) -> (Vec<N>, Vec<N>) {
    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.dependencies().len()).collect();
    if in_degree.iter().all(|&d| d == 0) {
        return (nodes, Vec::new());
    }

    let mut index_of: HashMap<N::Key, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        index_of.entry(node.key()).or_insert(i);
    }

    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(nodes.len());

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for dependent in nodes[i].dependents() {
            let Some(&j) = index_of.get(dependent) else {
                continue;
            };
            if in_degree[j] == 0 {
                continue;
            }
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                queue.push_back(j);
            }
        }
    }

    let mut slots: Vec<Option<N>> = nodes.into_iter().map(Some).collect();
    let mut sorted: Vec<N> = order.iter().filter_map(|&i| slots[i].take()).collect();
    let unorderable: Vec<N> = slots.into_iter().flatten().collect();

    if descending {
        sorted.reverse();
    }
    (sorted, unorderable)
}
