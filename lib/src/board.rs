use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use itertools::Itertools;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use strum::VariantArray;

use crate::errors::BoardError;
use crate::location::{Direction, Location, Pos};
use crate::memo::SingleMemo;

/// A color label. Typical play uses at most ten distinct values, but any
/// byte is a valid label.
pub type Color = u8;

/// The raw byte sequence of a board, usable as a collision-free map key:
/// two boards of equal size compare equal exactly when their keys do.
pub type BoardKey = Box<[u8]>;

/// A square Flood-It board.
///
/// Boards are values: every transformation returns a new board and no
/// operation mutates its receiver. Equality and hashing are structural over
/// the cell bytes.
///
/// A move recolors the maximal connected same-color region anchored at the
/// top left corner (the "top-left blob"), absorbing any neighboring cells
/// of the chosen color. The game ends when one color covers the board.
///
/// Derived views that the search queries over and over (the byte key, the
/// color set, the perimeter of the top-left blob) are computed once per
/// board value and kept in an interior cache; equality and hashing read
/// only the cells, and a played board starts with an empty cache of its
/// own.
#[derive(Clone)]
pub struct Board {
    cells: Array2<Color>,
    cache: RefCell<BoardCache>,
}

/// Lazily-filled views of one board. Perimeter queries are single-slot
/// per position, which covers the search's position-0 hot path.
#[derive(Clone, Default)]
struct BoardCache {
    key: Option<BoardKey>,
    colors: Option<Vec<Color>>,
    perimeter_blocks: SingleMemo<Pos, Vec<Pos>>,
    perimeter_colors: SingleMemo<Pos, Vec<Color>>,
}

impl Board {
    pub const DEFAULT_SIZE: usize = 14;
    pub const DEFAULT_COLORS: usize = 6;

    /// Build a board from row-major cells. The length must be a nonzero
    /// perfect square.
    pub fn from_cells(cells: Vec<Color>) -> Result<Self, BoardError> {
        let size = cells.len().isqrt();
        if cells.is_empty() || size * size != cells.len() {
            return Err(BoardError::NotSquare { cells: cells.len() });
        }
        // row-major square layout; the shape is derived from the length
        let cells = Array2::from_shape_vec((size, size), cells).unwrap();
        Ok(Self {
            cells,
            cache: Default::default(),
        })
    }

    /// Parse a board from text, keeping only decimal digits. Anything else
    /// (whitespace, separators, noise) is skipped, so the output of
    /// [`Display`] round-trips and so do looser hand-written fixtures.
    pub fn parse(input: &str) -> Result<Self, BoardError> {
        let digits = input
            .chars()
            .filter_map(|ch| ch.to_digit(10))
            .map(|digit| digit as Color)
            .collect_vec();
        Self::from_cells(digits)
    }

    /// Generate a shuffled random board with one cell of each color
    /// guaranteed and the remaining cells drawn uniformly from
    /// `0..colors`.
    pub fn random(size: usize, colors: usize) -> Result<Self, BoardError> {
        if colors == 0 || size * size < colors {
            return Err(BoardError::TooSmall { size, colors });
        }
        let mut rng = rand::rng();
        let mut cells = Vec::with_capacity(size * size);
        cells.extend((0..colors).map(|color| color as Color));
        cells.extend((colors..size * size).map(|_| rng.random_range(0..colors) as Color));
        cells.shuffle(&mut rng);
        Self::from_cells(cells)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    /// Total cell count, `size * size`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        // owned arrays are standard layout
        self.cells.as_slice().unwrap()
    }

    /// The color at a flat position.
    pub fn color_at(&self, pos: Pos) -> Color {
        self.bytes()[pos]
    }

    /// Flat position of `(x, y)`.
    pub fn position(&self, x: usize, y: usize) -> Pos {
        Location(x, y).flatten(self.size())
    }

    /// Location of a flat position.
    pub fn location(&self, pos: Pos) -> Location {
        Location::from_pos(pos, self.size())
    }

    /// The raw byte fingerprint of this board. Computed once.
    pub fn key(&self) -> BoardKey {
        if let Some(key) = &self.cache.borrow().key {
            return key.clone();
        }
        let key: BoardKey = self.bytes().into();
        self.cache.borrow_mut().key = Some(key.clone());
        key
    }

    /// Distinct colors present, in first-seen scan order. Computed once.
    pub fn colors(&self) -> Vec<Color> {
        if let Some(colors) = &self.cache.borrow().colors {
            return colors.clone();
        }
        let colors = self.bytes().iter().copied().unique().collect_vec();
        self.cache.borrow_mut().colors = Some(colors.clone());
        colors
    }

    /// True once a single color covers the board.
    pub fn is_uniform(&self) -> bool {
        self.colors().len() == 1
    }

    /// In-bounds 4-neighbors of a flat position, between two (corner) and
    /// four (interior).
    pub fn adjacent_positions(&self, pos: Pos) -> Vec<Pos> {
        let location = self.location(pos);
        Direction::VARIANTS
            .iter()
            .map(|direction| direction.attempt_from(location))
            .filter(|next| next.in_bounds(self.size()))
            .map(|next| next.flatten(self.size()))
            .collect_vec()
    }

    /// Every position 4-connected to `pos` through cells of its color,
    /// found by an iterative flood fill over an explicit stack.
    pub fn blob_positions(&self, pos: Pos) -> Vec<Pos> {
        let color = self.color_at(pos);
        let mut seen = vec![false; self.len()];
        seen[pos] = true;
        let mut stack = vec![pos];
        let mut blob = Vec::new();
        while let Some(current) = stack.pop() {
            blob.push(current);
            for next in self.adjacent_positions(current) {
                if !seen[next] && self.color_at(next) == color {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        blob
    }

    /// Cell count of the blob at `pos`.
    pub fn blob_size(&self, pos: Pos) -> usize {
        self.blob_positions(pos).len()
    }

    /// Recolor the top-left blob to `color`, returning the resulting board.
    /// Playing the color already at position 0 returns the board unchanged.
    pub fn play_color(&self, color: Color) -> Board {
        if self.color_at(0) == color {
            return self.clone();
        }
        let mut cells = self.cells.clone();
        let slice = cells.as_slice_mut().unwrap();
        for pos in self.blob_positions(0) {
            slice[pos] = color;
        }
        // the cells changed, so the new board gets a cache of its own
        Board {
            cells,
            cache: Default::default(),
        }
    }

    /// One successor board per distinct perimeter color of the top-left
    /// blob. If any move completely absorbs a color (leaving the new
    /// top-left blob whole), only that board is returned: such a move
    /// dominates the alternatives.
    pub fn neighbor_boards(&self) -> Vec<Board> {
        let mut boards = Vec::new();
        for color in self.perimeter_colors(0) {
            let board = self.play_color(color);
            if board.blob_is_whole(0) {
                return vec![board];
            }
            boards.push(board);
        }
        boards
    }

    /// Manhattan distance between two flat positions.
    pub fn distance(&self, a: Pos, b: Pos) -> usize {
        self.location(a).manhattan(self.location(b))
    }

    /// Minimum Manhattan distance between any cell of the blob at `a` and
    /// any cell of the blob at `b`; 0 when they are the same blob and 1
    /// when the blobs touch.
    pub fn blob_distance(&self, a: Pos, b: Pos) -> usize {
        let blob_a = self.blob_positions(a);
        if blob_a.contains(&b) {
            return 0;
        }
        let blob_b = self.blob_positions(b);
        blob_a
            .iter()
            .cartesian_product(blob_b.iter())
            .map(|(&from, &to)| self.distance(from, to))
            .min()
            .unwrap()
    }

    /// Deduplicated cells adjacent to the blob at `pos` but outside it,
    /// ascending. Computed once per position.
    pub fn perimeter_blocks(&self, pos: Pos) -> Vec<Pos> {
        if let Some(blocks) = self.cache.borrow().perimeter_blocks.get(&pos) {
            return blocks.clone();
        }
        let color = self.color_at(pos);
        let blocks = self
            .blob_positions(pos)
            .iter()
            .flat_map(|&member| self.adjacent_positions(member))
            // an adjacent cell of the blob's own color would be part of the blob
            .filter(|&adjacent| self.color_at(adjacent) != color)
            .sorted_unstable()
            .dedup()
            .collect_vec();
        self.cache
            .borrow_mut()
            .perimeter_blocks
            .insert(pos, blocks.clone());
        blocks
    }

    /// Perimeter length of the blob at `pos`.
    pub fn perimeter(&self, pos: Pos) -> usize {
        self.perimeter_blocks(pos).len()
    }

    /// Distinct colors among the perimeter blocks of the blob at `pos`,
    /// in ascending-position first-seen order. Computed once per position.
    pub fn perimeter_colors(&self, pos: Pos) -> Vec<Color> {
        if let Some(colors) = self.cache.borrow().perimeter_colors.get(&pos) {
            return colors.clone();
        }
        let colors = self
            .perimeter_blocks(pos)
            .into_iter()
            .map(|block| self.color_at(block))
            .unique()
            .collect_vec();
        self.cache
            .borrow_mut()
            .perimeter_colors
            .insert(pos, colors.clone());
        colors
    }

    /// True iff no cell outside the blob at `pos` carries its color.
    pub fn blob_is_whole(&self, pos: Pos) -> bool {
        let color = self.color_at(pos);
        let total = self.bytes().iter().filter(|&&cell| cell == color).count();
        self.blob_size(pos) == total
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes().hash(state);
    }
}

impl Display for Board {
    /// `size` lines of `size` digits, separated by `\n`, no trailing
    /// newline. Colors above 9 render as `?` and do not round-trip; keep
    /// such boards as raw cells.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, row) in self.cells.rows().into_iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            for &cell in row {
                write!(f, "{}", char::from_digit(u32::from(cell), 10).unwrap_or('?'))?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board({}x{})\n{}", self.size(), self.size(), self)
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
