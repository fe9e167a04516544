use strum::VariantArray;

pub(crate) type Coord = usize;

/// Flat cell index on a square board: `p = x + y * size`.
pub type Pos = usize;

/// A location `(x, y)` on a board. The top left corner is `Location(0, 0)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// Row-major `(row, column)` index into an [`ndarray::Array2`].
    pub(crate) fn as_index(self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(
            self.0.wrapping_add_signed(rhs.0),
            self.1.wrapping_add_signed(rhs.1),
        )
    }

    pub(crate) fn flatten(self, size: Coord) -> Pos {
        self.1 * size + self.0
    }

    pub(crate) fn from_pos(pos: Pos, size: Coord) -> Self {
        Self(pos % size, pos / size)
    }

    pub(crate) fn in_bounds(self, size: Coord) -> bool {
        self.0 < size && self.1 < size
    }

    pub(crate) fn manhattan(self, other: Self) -> usize {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1)
    }
}

/// The four directions a flood can spread in.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Attempt the step from `location` in the direction specified by `self`.
    /// The result wraps on underflow; callers bounds-check it.
    pub(crate) fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }
}
