//! # `floodlit`
//!
//! A solver engine for the [Flood-It](https://en.wikipedia.org/wiki/Flood_fill#Flood-it) puzzle.
//! The game is played on a square grid of colored cells: each move recolors the connected
//! region at the top left corner, absorbing neighboring cells of the chosen color, and the
//! goal is to make the board uniform in as few moves as possible.
//!
//! Build a [`Board`] with [`Board::random`] or [`Board::parse`], then hand it to
//! [`solve_board`]. The default mode runs A* under a weighted (non-admissible) heuristic and
//! finds near-minimal solutions quickly; `admissible` mode guarantees a minimal move count.
//! [`solve_board_greedy`] trades a few extra moves for a fraction of the cost.
//!
//! # Internals
//!
//! The heuristic is built from the starting board once per solve: the board is "blobified"
//! into its connected regions, the regions become nodes of an adjacency graph, and a
//! shortest-path mesh is precomputed from each hard corner of the board. At every search
//! node the length of the cheapest blob chain from the flood frontier to the farthest
//! corner, corrected for colors the chain cannot absorb, bounds the remaining moves from
//! below. Flood-It is NP-hard in general, which is why the default mode trades the
//! optimality guarantee for weighted search.

pub use blob::{BlobId, BlobMap};
pub use board::{Board, BoardKey, Color};
pub use errors::{BoardError, SearchError};
pub use location::{Location, Pos};
pub use solve::{
    moves_of, position_mesh, solve_board, solve_board_greedy, solve_bottom_right,
    AdmissibleHeuristic, PositionMesh, SolveOptions, WeightedHeuristic,
};

pub mod astar;
mod blob;
mod board;
mod errors;
pub mod greedy;
pub mod heap;
mod location;
pub mod memo;
pub mod mesh;
mod solve;
mod tests;
