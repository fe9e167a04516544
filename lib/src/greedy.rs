use std::hash::Hash;

use itertools::Itertools;

use crate::memo::LruMemo;

/// Options for a [`GreedyWalker`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyOptions {
    /// Take the lowest-scoring neighbor instead of the highest.
    pub prefer_lower: bool,
}

/// An iterative best-neighbor walker.
///
/// At every non-terminal node the walker moves to the neighbor with the
/// best score and records the whole walk in a bounded memo keyed by the
/// start node, so repeated walks from the same subproblem are free. That
/// reuse is what makes the walker viable as a fast solver inside A*, where
/// it is consulted on every expansion.
///
/// Every non-terminal node must have at least one neighbor; callers
/// guarantee this by construction.
pub struct GreedyWalker<N, K> {
    memo: LruMemo<K, Vec<N>>,
    prefer_lower: bool,
}

impl<N, K> GreedyWalker<N, K>
where
    N: Clone,
    K: Eq + Hash + Clone,
{
    pub const MEMO_CAPACITY: usize = 1000;

    pub fn new(options: GreedyOptions) -> Self {
        Self {
            memo: LruMemo::new(Self::MEMO_CAPACITY),
            prefer_lower: options.prefer_lower,
        }
    }

    /// Walk from `start` to a terminal node, returning the visited sequence
    /// `[start, ..., end]` inclusive.
    pub fn walk(
        &mut self,
        start: N,
        mut is_end: impl FnMut(&N) -> bool,
        mut neighbors: impl FnMut(&N) -> Vec<N>,
        mut score: impl FnMut(&N) -> f32,
        mut get_key: impl FnMut(&N) -> K,
    ) -> Vec<N> {
        if let Some(path) = self.memo.get(&get_key(&start)) {
            return path.clone();
        }

        let mut path = vec![start.clone()];
        let mut current = start.clone();
        while !is_end(&current) {
            let scored = neighbors(&current)
                .into_iter()
                .map(|neighbor| (score(&neighbor), neighbor))
                .collect_vec();
            let (_, next) = if self.prefer_lower {
                scored.into_iter().min_by(|a, b| a.0.total_cmp(&b.0))
            } else {
                scored.into_iter().max_by(|a, b| a.0.total_cmp(&b.0))
            }
            .expect("non-terminal nodes have at least one neighbor");
            path.push(next.clone());
            current = next;
        }

        self.memo.insert(get_key(&start), path.clone());
        path
    }
}
