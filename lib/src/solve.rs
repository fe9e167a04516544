use itertools::Itertools;
use log::debug;

use crate::astar::{astar, AStarOptions, FastPath, SearchSpace};
use crate::blob::{BlobId, BlobMap};
use crate::board::{Board, BoardKey, Color};
use crate::errors::SearchError;
use crate::greedy::{GreedyOptions, GreedyWalker};
use crate::location::Pos;
use crate::memo::{LruMemo, SingleMemo};
use crate::mesh::NavMesh;

/// Options for [`solve_board`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SolveOptions {
    /// Use the admissible heuristic, guaranteeing a minimal move count at
    /// the price of a much larger search.
    pub admissible: bool,
    /// Prune any search node whose f-cost exceeds this.
    pub max_f_cost: Option<f32>,
}

/// A lower bound on the moves left to flood a board, precomputed from the
/// starting position.
///
/// Three meshes over the start board's blob-adjacency graph, one per hard
/// corner (top right, bottom left, bottom right), give the length of the
/// shortest blob chain from the current flood frontier to each corner.
/// Along such a chain consecutive blobs never share a color, so one move
/// absorbs at most one chain link, and each color still on the board but
/// absent from the chain costs at least one further move. The larger of
/// that bound and the plain remaining-color count is returned.
///
/// Cells keep their starting color until the top-left blob absorbs them,
/// and the top-left blob only grows, so the start board's blob numbering
/// stays meaningful for every reachable position.
pub struct AdmissibleHeuristic {
    start_blobs: BlobMap,
    // color per blob number; entry 0 unused
    blob_colors: Vec<Color>,
    meshes: Vec<(Pos, NavMesh<BlobId>)>,
}

impl AdmissibleHeuristic {
    pub fn new(start: &Board) -> Result<Self, SearchError> {
        let start_blobs = start.blob_map();
        let graph = start_blobs.adjacency();

        let mut blob_colors = vec![0; start_blobs.count() + 1];
        for pos in 0..start.len() {
            blob_colors[usize::from(start_blobs.id_at(pos))] = start.color_at(pos);
        }

        let size = start.size();
        let hard_targets = [size - 1, size * (size - 1), size * size - 1];
        let meshes = hard_targets
            .into_iter()
            .map(|target| -> Result<(Pos, NavMesh<BlobId>), SearchError> {
                let mesh = NavMesh::build(
                    start_blobs.id_at(target),
                    |blob| graph.neighbors(blob).collect_vec(),
                    |_, _| 1.0,
                )?;
                Ok((target, mesh))
            })
            .collect::<Result<Vec<_>, SearchError>>()?;
        debug!(
            "built {} corner meshes over {} blobs",
            meshes.len(),
            start_blobs.count()
        );

        Ok(Self {
            start_blobs,
            blob_colors,
            meshes,
        })
    }

    /// Lower bound on the moves left from `board`, which must be reachable
    /// from the starting position this heuristic was built for.
    pub fn estimate(&self, board: &Board) -> f32 {
        let frontier = board.perimeter_blocks(0);
        if frontier.is_empty() {
            return 0.0;
        }
        let test_from = frontier
            .iter()
            .map(|&block| self.start_blobs.id_at(block))
            .unique()
            .collect_vec();

        let top_left = board.blob_positions(0);
        let colors = board.colors();
        let whole = board.blob_is_whole(0);
        let flood_color = board.color_at(0);

        let mut longest = 0;
        for (target, mesh) in &self.meshes {
            if top_left.contains(target) {
                continue;
            }
            let best = test_from
                .iter()
                .filter_map(|&from| {
                    let path = mesh.path_to(from)?;
                    let unhandled = colors
                        .iter()
                        .filter(|&&color| {
                            !path
                                .iter()
                                .any(|&blob| self.blob_colors[usize::from(blob)] == color)
                                && !(whole && color == flood_color)
                        })
                        .count();
                    // every chain blob sits outside the flood and costs one move
                    Some(path.len() + unhandled)
                })
                .min();
            if let Some(best) = best {
                longest = longest.max(best);
            }
        }

        let baseline = colors.len() - usize::from(whole);
        longest.max(baseline) as f32
    }
}

/// The default solving heuristic: the admissible bound, inflated tenfold,
/// plus a small reward for large floods. Non-admissible, but it steers the
/// search to near-minimal solutions in a fraction of the expansions.
pub struct WeightedHeuristic {
    admissible: AdmissibleHeuristic,
    last_estimate: SingleMemo<BoardKey, f32>,
    blob_sizes: LruMemo<(BoardKey, Pos), usize>,
    area: usize,
}

impl WeightedHeuristic {
    const BLOB_SIZE_MEMO_CAPACITY: usize = 100;

    pub fn new(start: &Board) -> Result<Self, SearchError> {
        Ok(Self {
            admissible: AdmissibleHeuristic::new(start)?,
            last_estimate: SingleMemo::new(),
            blob_sizes: LruMemo::new(Self::BLOB_SIZE_MEMO_CAPACITY),
            area: start.len(),
        })
    }

    pub fn estimate(&mut self, board: &Board) -> f32 {
        let Self {
            admissible,
            last_estimate,
            blob_sizes,
            area,
        } = self;
        let key = board.key();
        let lower_bound =
            last_estimate.get_or_insert_with(key.clone(), || admissible.estimate(board));
        let blob_size = blob_sizes.get_or_insert_with((key, 0), || board.blob_size(0));
        10.0 * lower_bound + 0.01 * (*area - blob_size) as f32
    }
}

enum HeuristicKind {
    Admissible(AdmissibleHeuristic),
    Weighted(WeightedHeuristic),
}

impl HeuristicKind {
    fn admissible(&self) -> &AdmissibleHeuristic {
        match self {
            Self::Admissible(heuristic) => heuristic,
            Self::Weighted(heuristic) => &heuristic.admissible,
        }
    }
}

/// The full-game search space: nodes are boards, keyed by their raw bytes;
/// each move costs 1; the greedy walker doubles as the fast solver.
struct FloodSearch {
    heuristic: HeuristicKind,
    fast: Option<GreedyWalker<Board, BoardKey>>,
}

impl SearchSpace for FloodSearch {
    type Node = Board;
    type Key = BoardKey;

    fn key(&self, board: &Board) -> BoardKey {
        board.key()
    }

    fn is_end(&self, board: &Board) -> bool {
        board.is_uniform()
    }

    fn neighbors(&mut self, board: &Board) -> Vec<Board> {
        board.neighbor_boards()
    }

    fn distance(&mut self, _from: &Board, _to: &Board) -> f32 {
        1.0
    }

    fn heuristic(&mut self, board: &Board) -> f32 {
        match &mut self.heuristic {
            HeuristicKind::Admissible(heuristic) => heuristic.estimate(board),
            HeuristicKind::Weighted(heuristic) => heuristic.estimate(board),
        }
    }

    fn fast_solve(&mut self, board: &Board) -> Option<FastPath<Board>> {
        let Self { heuristic, fast } = self;
        let walker = fast.as_mut()?;
        let admissible = heuristic.admissible();
        let path = walker.walk(
            board.clone(),
            |board| board.is_uniform(),
            |board| board.neighbor_boards(),
            |board| admissible.estimate(board),
            |board| board.key(),
        );
        Some(FastPath {
            cost: (path.len() - 1) as f32,
            path,
        })
    }
}

/// Solve a board, returning every state from `start` to the uniform
/// terminal inclusive. The moves are the top-left colors of the successor
/// states (see [`moves_of`]).
///
/// The default weighted mode is fast and near-optimal; `admissible` mode
/// guarantees a minimal move count.
pub fn solve_board(start: &Board, options: &SolveOptions) -> Result<Vec<Board>, SearchError> {
    debug!(
        "solving {0}x{0} board, {1} colors, admissible={2}",
        start.size(),
        start.colors().len(),
        options.admissible
    );
    let heuristic = if options.admissible {
        HeuristicKind::Admissible(AdmissibleHeuristic::new(start)?)
    } else {
        HeuristicKind::Weighted(WeightedHeuristic::new(start)?)
    };
    let space = FloodSearch {
        heuristic,
        fast: Some(GreedyWalker::new(GreedyOptions { prefer_lower: true })),
    };
    let path = astar(
        space,
        start.clone(),
        AStarOptions {
            max_f_cost: options.max_f_cost,
            ..AStarOptions::default()
        },
    )?;
    debug!("solved in {} moves", path.len() - 1);
    Ok(path)
}

/// Solve a board greedily: at every step take the neighbor with the lowest
/// admissible estimate. With `look_ahead > 0`, score each neighbor by the
/// best estimate among its own successors instead.
///
/// Much faster than [`solve_board`] and usually a handful of moves worse.
pub fn solve_board_greedy(start: &Board, look_ahead: usize) -> Result<Vec<Board>, SearchError> {
    let heuristic = AdmissibleHeuristic::new(start)?;
    let mut walker = GreedyWalker::new(GreedyOptions { prefer_lower: true });
    let path = walker.walk(
        start.clone(),
        |board| board.is_uniform(),
        |board| board.neighbor_boards(),
        |board| {
            if look_ahead == 0 || board.is_uniform() {
                heuristic.estimate(board)
            } else {
                board
                    .neighbor_boards()
                    .iter()
                    .map(|next| heuristic.estimate(next))
                    .fold(f32::INFINITY, f32::min)
            }
        },
        |board| board.key(),
    );
    Ok(path)
}

/// The partial-goal search space of [`solve_bottom_right`]: done as soon
/// as the top-left blob reaches the bottom-right corner.
struct CornerSearch {
    start_blobs: BlobMap,
    mesh: NavMesh<BlobId>,
    corner: Pos,
    multiplier: f32,
}

impl SearchSpace for CornerSearch {
    type Node = Board;
    type Key = BoardKey;

    fn key(&self, board: &Board) -> BoardKey {
        board.key()
    }

    fn is_end(&self, board: &Board) -> bool {
        board.blob_positions(0).contains(&self.corner)
    }

    fn neighbors(&mut self, board: &Board) -> Vec<Board> {
        board.neighbor_boards()
    }

    fn distance(&mut self, _from: &Board, _to: &Board) -> f32 {
        1.0
    }

    fn heuristic(&mut self, board: &Board) -> f32 {
        if board.blob_positions(0).contains(&self.corner) {
            return 0.0;
        }
        let chain = board
            .perimeter_blocks(0)
            .iter()
            .map(|&block| self.start_blobs.id_at(block))
            .unique()
            .filter_map(|blob| self.mesh.distance_to(blob))
            .fold(f32::INFINITY, f32::min);
        if chain.is_finite() {
            self.multiplier * (chain + 1.0)
        } else {
            0.0
        }
    }
}

/// Solve only until the bottom-right corner joins the top-left blob,
/// steered by the corner mesh scaled by `multiplier`. Used to cheaply
/// bound the full solver; admissible only for `multiplier <= 1`.
pub fn solve_bottom_right(start: &Board, multiplier: f32) -> Result<Vec<Board>, SearchError> {
    let start_blobs = start.blob_map();
    let graph = start_blobs.adjacency();
    let corner = start.len() - 1;
    let mesh = NavMesh::build(
        start_blobs.id_at(corner),
        |blob| graph.neighbors(blob).collect_vec(),
        |_, _| 1.0,
    )?;
    let space = CornerSearch {
        start_blobs,
        mesh,
        corner,
        multiplier,
    };
    astar(space, start.clone(), AStarOptions::default())
}

/// A reusable shortest-chain query from any position's blob to a fixed
/// target position, over a board's blob-adjacency graph.
pub struct PositionMesh {
    blobs: BlobMap,
    mesh: NavMesh<BlobId>,
}

impl PositionMesh {
    /// The blob chain `[blob-at-pos, ..., blob-at-target]`.
    pub fn path_from(&self, pos: Pos) -> Option<Vec<BlobId>> {
        let mut path = self.mesh.path_to(self.blobs.id_at(pos))?;
        // the mesh is sourced at the target; read the chain outward
        path.reverse();
        Some(path)
    }

    pub fn blobs(&self) -> &BlobMap {
        &self.blobs
    }
}

/// Build a [`PositionMesh`] for `target` over `board`'s blob graph.
pub fn position_mesh(board: &Board, target: Pos) -> Result<PositionMesh, SearchError> {
    let blobs = board.blob_map();
    let graph = blobs.adjacency();
    let mesh = NavMesh::build(
        blobs.id_at(target),
        |blob| graph.neighbors(blob).collect_vec(),
        |_, _| 1.0,
    )?;
    Ok(PositionMesh { blobs, mesh })
}

/// The color played at each step of a solution path, read off the top-left
/// cell of every successor state.
pub fn moves_of(path: &[Board]) -> Vec<Color> {
    path.iter()
        .skip(1)
        .map(|board| board.color_at(0))
        .collect_vec()
}
