use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::trace;

use crate::errors::SearchError;
use crate::heap::MinHeap;

/// Slack added to the fast-solver admission test so that float rounding in
/// accumulated f-costs cannot reject an exactly-matching shortcut.
const FAST_SOLVER_EPSILON: f32 = 1e-5;

/// A search space: the node type, its map key, and the callbacks A* needs.
///
/// The key is the node's identity in the open/closed bookkeeping; the
/// default for simple spaces is the node itself, while board search keys by
/// the raw cell bytes to avoid comparing whole boards per probe.
pub trait SearchSpace {
    type Node: Clone;
    type Key: Eq + Hash + Clone;

    fn key(&self, node: &Self::Node) -> Self::Key;
    fn is_end(&self, node: &Self::Node) -> bool;
    fn neighbors(&mut self, node: &Self::Node) -> Vec<Self::Node>;
    fn distance(&mut self, from: &Self::Node, to: &Self::Node) -> f32;

    /// Guess of the remaining cost from `node` to a terminal node. Never
    /// negative. The default makes A* degenerate to Dijkstra.
    fn heuristic(&mut self, _node: &Self::Node) -> f32 {
        0.0
    }

    /// An optional shortcut consulted on each expansion. A returned
    /// solution is accepted when its cost fits within the expanded node's
    /// remaining f-cost allowance.
    fn fast_solve(&mut self, _node: &Self::Node) -> Option<FastPath<Self::Node>> {
        None
    }
}

/// A complete sub-solution offered by [`SearchSpace::fast_solve`]: a path
/// from the queried node to a terminal node, and its cost.
pub struct FastPath<N> {
    pub cost: f32,
    pub path: Vec<N>,
}

/// Tuning knobs for a single search.
#[derive(Clone, Copy, Debug)]
pub struct AStarOptions {
    /// Prune any node whose tentative f-cost exceeds this.
    pub max_f_cost: Option<f32>,
    /// Iterations per [`AStarDriver::step`] call.
    pub block_size: usize,
}

impl Default for AStarOptions {
    fn default() -> Self {
        Self {
            max_f_cost: None,
            block_size: 100,
        }
    }
}

/// Outcome of driving a search one block forward.
pub enum SearchStatus<N> {
    /// More work remains (or the driver is paused).
    Pending,
    Done(Result<Vec<N>, SearchError>),
}

/// Run a search to completion.
pub fn astar<S: SearchSpace>(
    space: S,
    start: S::Node,
    options: AStarOptions,
) -> Result<Vec<S::Node>, SearchError> {
    AStarDriver::new(space, start, options).run()
}

/// A* as a resumable value.
///
/// The driver owns the whole search state; calling [`step`](Self::step)
/// advances it by at most `block_size` iterations, so a caller can
/// interleave search with other work, pause, resume, or drop the driver to
/// abandon the search and reclaim everything at once. Driving a search in
/// blocks yields exactly the same expansions, path, and errors as
/// [`run`](Self::run).
///
/// The frontier heap may hold stale entries for a key after a re-insertion
/// with a better g-cost; staleness is resolved on pop by skipping keys no
/// longer in the open set.
pub struct AStarDriver<S: SearchSpace> {
    space: S,
    options: AStarOptions,
    open: HashMap<S::Key, S::Node>,
    closed: HashSet<S::Key>,
    came_from: HashMap<S::Key, S::Node>,
    g_cost: HashMap<S::Key, f32>,
    frontier: MinHeap<S::Key>,
    paused: bool,
    expanded: usize,
}

impl<S: SearchSpace> AStarDriver<S> {
    pub fn new(mut space: S, start: S::Node, options: AStarOptions) -> Self {
        let key = space.key(&start);
        let mut frontier = MinHeap::new();
        frontier.put(space.heuristic(&start), key.clone());
        Self {
            space,
            options,
            open: HashMap::from([(key.clone(), start)]),
            closed: HashSet::new(),
            came_from: HashMap::new(),
            g_cost: HashMap::from([(key, 0.0)]),
            frontier,
            paused: false,
            expanded: 0,
        }
    }

    /// Stop making progress; subsequent [`step`](Self::step) calls return
    /// [`SearchStatus::Pending`] without doing any work.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Undo [`pause`](Self::pause). Idempotent.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance the search by at most `block_size` iterations.
    pub fn step(&mut self) -> SearchStatus<S::Node> {
        if self.paused {
            return SearchStatus::Pending;
        }
        for _ in 0..self.options.block_size {
            if let Some(done) = self.iterate() {
                return SearchStatus::Done(done);
            }
        }
        trace!(
            "search pending: {} expanded, {} open, {} closed",
            self.expanded,
            self.open.len(),
            self.closed.len()
        );
        SearchStatus::Pending
    }

    /// Drive the search to completion, ignoring the pause flag.
    pub fn run(mut self) -> Result<Vec<S::Node>, SearchError> {
        self.resume();
        loop {
            if let SearchStatus::Done(result) = self.step() {
                return result;
            }
        }
    }

    /// One expansion. `None` means the search is still in progress.
    fn iterate(&mut self) -> Option<Result<Vec<S::Node>, SearchError>> {
        // pop until a current entry surfaces
        let (current_f, key) = loop {
            if self.frontier.is_empty() {
                return Some(Err(SearchError::NoPathFound));
            }
            match self.frontier.pop_pair() {
                Ok((f, key)) if self.open.contains_key(&key) => break (f, key),
                Ok(_) => continue,
                Err(err) => return Some(Err(err)),
            }
        };
        let node = self.open[&key].clone();

        if self.space.is_end(&node) {
            return Some(Ok(self.reconstruct(key, node)));
        }

        let g = self.g_cost[&key];
        if let Some(fast) = self.space.fast_solve(&node) {
            if fast.cost <= current_f - g + FAST_SOLVER_EPSILON {
                let mut path = self.reconstruct(key, node);
                // the fast path starts at the node itself
                path.pop();
                path.extend(fast.path);
                return Some(Ok(path));
            }
        }

        self.open.remove(&key);
        self.closed.insert(key);
        self.expanded += 1;

        for neighbor in self.space.neighbors(&node) {
            let neighbor_key = self.space.key(&neighbor);
            if self.closed.contains(&neighbor_key) {
                continue;
            }
            let tentative = g + self.space.distance(&node, &neighbor);
            if self.open.contains_key(&neighbor_key)
                && tentative > self.g_cost[&neighbor_key]
            {
                continue;
            }
            let f = tentative + self.space.heuristic(&neighbor);
            if self.options.max_f_cost.is_some_and(|ceiling| f > ceiling) {
                continue;
            }
            self.came_from.insert(neighbor_key.clone(), node.clone());
            self.g_cost.insert(neighbor_key.clone(), tentative);
            self.frontier.put(f, neighbor_key.clone());
            self.open.insert(neighbor_key, neighbor);
        }

        None
    }

    /// Walk predecessors back from `node` and return the start-to-node path.
    fn reconstruct(&self, mut key: S::Key, node: S::Node) -> Vec<S::Node> {
        let mut path = vec![node];
        while let Some(previous) = self.came_from.get(&key) {
            path.push(previous.clone());
            key = self.space.key(previous);
        }
        path.reverse();
        path
    }
}
