use std::collections::HashMap;

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;

use crate::board::{Board, Color};
use crate::location::{Direction, Location, Pos};

/// A 1-based blob number. 16 bits match the board's cell-count ceiling.
pub type BlobId = u16;

/// The "blobified" board: a parallel grid mapping every cell to its blob
/// number. Numbers are assigned in scanning order, starting at 1, as each
/// unnumbered cell floods its entire blob.
pub struct BlobMap {
    ids: Array2<BlobId>,
    count: usize,
}

impl BlobMap {
    pub fn build(board: &Board) -> Self {
        let size = board.size();
        let mut ids = Array2::<BlobId>::from_elem((size, size), 0);
        let mut next = 0;
        for pos in 0..board.len() {
            if ids[Location::from_pos(pos, size).as_index()] != 0 {
                continue;
            }
            next += 1;
            for member in board.blob_positions(pos) {
                ids[Location::from_pos(member, size).as_index()] = next;
            }
        }
        Self {
            ids,
            count: usize::from(next),
        }
    }

    /// Blob number of a flat position.
    pub fn id_at(&self, pos: Pos) -> BlobId {
        let size = self.ids.nrows();
        self.ids[Location::from_pos(pos, size).as_index()]
    }

    /// Total number of distinct blobs.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The blob-adjacency graph: one node per blob number, one undirected
    /// edge per pair of touching blobs. Edges are discovered by sweeping
    /// each cell's rightward and downward steps, so every adjacency is
    /// visited exactly once.
    pub fn adjacency(&self) -> UnGraphMap<BlobId, ()> {
        let size = self.ids.nrows();
        let mut graph = UnGraphMap::with_capacity(self.count, self.count * 2);
        for pos in 0..self.ids.len() {
            let here = self.id_at(pos);
            graph.add_node(here);
            let location = Location::from_pos(pos, size);
            for direction in [Direction::Right, Direction::Down] {
                let next = direction.attempt_from(location);
                if !next.in_bounds(size) {
                    continue;
                }
                let there = self.id_at(next.flatten(size));
                if there != here {
                    graph.add_edge(here, there, ());
                }
            }
        }
        graph
    }
}

impl Board {
    /// The blobified counterpart of this board.
    pub fn blob_map(&self) -> BlobMap {
        BlobMap::build(self)
    }

    /// Distinct blob numbers among the perimeter blocks of the blob at
    /// `pos`, resolved through this board's own [`BlobMap`].
    pub fn perimeter_blobs(&self, pos: Pos) -> Vec<BlobId> {
        let map = self.blob_map();
        self.perimeter_blocks(pos)
            .into_iter()
            .map(|block| map.id_at(block))
            .unique()
            .collect_vec()
    }

    /// How many distinct blobs each present color is split into.
    pub fn blob_counts(&self) -> HashMap<Color, usize> {
        let map = self.blob_map();
        let mut color_of: HashMap<BlobId, Color> = HashMap::with_capacity(map.count());
        for pos in 0..self.len() {
            color_of.entry(map.id_at(pos)).or_insert(self.color_at(pos));
        }
        color_of.values().copied().counts()
    }

    /// Total number of distinct blobs.
    pub fn net_blob_count(&self) -> usize {
        self.blob_map().count()
    }

    /// True iff every color in `colors` is split across at least two blobs.
    pub fn colors_segmented(&self, colors: &[Color]) -> bool {
        let counts = self.blob_counts();
        colors
            .iter()
            .all(|color| counts.get(color).copied().unwrap_or(0) >= 2)
    }

    /// [`colors_segmented`](Self::colors_segmented) over every present color.
    pub fn all_blobs_segmented(&self) -> bool {
        self.colors_segmented(&self.colors())
    }
}
