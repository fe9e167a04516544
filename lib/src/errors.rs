use thiserror::Error;

/// Reasons a board cannot be constructed.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// `Board::random` was asked for more colors than the board has cells.
    #[error("a {size}x{size} board cannot hold {colors} distinct colors")]
    TooSmall { size: usize, colors: usize },
    /// The cell count is not a perfect square, so no side length fits.
    #[error("{cells} cells do not form a square board")]
    NotSquare { cells: usize },
}

/// Failures surfaced by the search components.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The open set was exhausted without reaching a terminal node.
    #[error("no path to a terminal node")]
    NoPathFound,
    /// `pop_pair` on an empty heap. The search loops never pop without
    /// checking, so seeing this indicates a caller bug.
    #[error("pop from an empty heap")]
    EmptyHeap,
}
