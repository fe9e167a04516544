use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::errors::SearchError;
use crate::heap::MinHeap;

/// A single-source shortest-path mesh.
///
/// Built once from a source node, then queried any number of times for the
/// shortest path to a target in the same component. The Flood-It solver
/// builds one per hard corner over the blob-adjacency graph, where the node
/// count is small enough that construction cost is negligible next to the
/// search it feeds.
pub struct NavMesh<N> {
    source: N,
    came_from: HashMap<N, N>,
    min_dist: HashMap<N, f32>,
}

impl<N> NavMesh<N>
where
    N: Copy + Eq + Hash,
{
    /// Enumerate the component reachable from `source`, then run Dijkstra
    /// over it with a stale-entry heap.
    pub fn build(
        source: N,
        mut neighbors: impl FnMut(N) -> Vec<N>,
        mut distance: impl FnMut(N, N) -> f32,
    ) -> Result<Self, SearchError> {
        // sweep out the reachable component, queueing any node never keyed before
        let mut nodes = vec![source];
        let mut seen = HashSet::from([source]);
        let mut index = 0;
        while index < nodes.len() {
            for next in neighbors(nodes[index]) {
                if seen.insert(next) {
                    nodes.push(next);
                }
            }
            index += 1;
        }

        let mut min_dist: HashMap<N, f32> =
            nodes.iter().map(|&node| (node, f32::INFINITY)).collect();
        min_dist.insert(source, 0.0);
        let mut came_from = HashMap::new();

        let mut heap = MinHeap::new();
        heap.put(0.0, source);
        while !heap.is_empty() {
            let (dist, node) = heap.pop_pair()?;
            if dist > min_dist[&node] {
                // stale entry from a since-improved re-insertion
                continue;
            }
            for next in neighbors(node) {
                let candidate = dist + distance(node, next);
                if candidate < min_dist[&next] {
                    min_dist.insert(next, candidate);
                    came_from.insert(next, node);
                    heap.put(candidate, next);
                }
            }
        }

        Ok(Self {
            source,
            came_from,
            min_dist,
        })
    }

    /// Shortest distance from the source to `target`; `None` outside the
    /// source's component.
    pub fn distance_to(&self, target: N) -> Option<f32> {
        self.min_dist.get(&target).copied()
    }

    /// Reconstruct the shortest path `[source, ..., target]` by composing
    /// predecessors; `[source]` when the target is the source itself, and
    /// `None` when the target is unreachable.
    pub fn path_to(&self, target: N) -> Option<Vec<N>> {
        let mut path = vec![target];
        let mut node = target;
        while let Some(&previous) = self.came_from.get(&node) {
            path.push(previous);
            node = previous;
        }
        if node != self.source {
            return None;
        }
        path.reverse();
        Some(path)
    }
}
