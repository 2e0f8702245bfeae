//! Cell grid state for the collapse search
//!
//! Each cell holds a possibility bitset and a support counter per
//! (tile, direction) pair. The counters record how many possibilities in
//! the neighbor on that side remain compatible with the tile; a counter
//! reaching zero for an in-bounds direction forces the tile out of the
//! cell. Out-of-bounds directions contribute no requirement.

use crate::algorithm::bitset::TileBitset;
use crate::spatial::tiles::TileSet;
use ndarray::{Array2, Array4};

/// Orthogonal grid direction, indexed 0..3 as N, E, S, W
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward row - 1
    North,
    /// Toward col + 1
    East,
    /// Toward row + 1
    South,
    /// Toward col - 1
    West,
}

impl Direction {
    /// All four directions in index order
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Dense index of this direction
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// The direction pointing back, `(d + 2) mod 4`
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Row and column deltas of one step in this direction
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Grid of cells under search, with possibility sets and support counters
///
/// Support is stored as a dense `(row, col, tile, direction)` array; the
/// per-cell possibility bitsets make collapse tests a popcount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    tile_count: usize,
    possibilities: Array2<TileBitset>,
    support: Array4<u16>,
}

impl CellGrid {
    /// Create a grid with every cell in full superposition
    ///
    /// Support counters start at zero; the propagator recomputes them
    /// before the first decision.
    pub fn new(rows: usize, cols: usize, tile_count: usize) -> Self {
        Self {
            rows,
            cols,
            tile_count,
            possibilities: Array2::from_elem((rows, cols), TileBitset::all(tile_count)),
            support: Array4::zeros((rows, cols, tile_count, 4)),
        }
    }

    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of tile types tracked per cell
    pub const fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Total cell count
    pub const fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Coordinates of the in-bounds neighbor on the given side, if any
    pub const fn neighbor(&self, row: usize, col: usize, direction: Direction) -> Option<(usize, usize)> {
        let (dr, dc) = direction.offset();
        let nr = row as i64 + dr;
        let nc = col as i64 + dc;
        if nr < 0 || nc < 0 || nr >= self.rows as i64 || nc >= self.cols as i64 {
            None
        } else {
            Some((nr as usize, nc as usize))
        }
    }

    /// Read-only view of a cell's possibility set
    pub fn possibilities(&self, row: usize, col: usize) -> Option<&TileBitset> {
        self.possibilities.get((row, col))
    }

    /// Cardinality of a cell's possibility set
    pub fn count(&self, row: usize, col: usize) -> usize {
        self.possibilities
            .get((row, col))
            .map_or(0, TileBitset::count)
    }

    /// Remove a tile from a cell's possibilities
    ///
    /// Returns true when the tile was present and is now gone. Emptying a
    /// cell is legal here; the propagator reads it back as a contradiction.
    pub fn remove_possibility(&mut self, row: usize, col: usize, tile: usize) -> bool {
        self.possibilities
            .get_mut((row, col))
            .is_some_and(|set| set.remove(tile))
    }

    /// Re-insert a tile into a cell's possibilities (undo path only)
    pub fn add_possibility(&mut self, row: usize, col: usize, tile: usize) {
        if let Some(set) = self.possibilities.get_mut((row, col)) {
            set.insert(tile);
        }
    }

    /// True iff the cell's possibility set has exactly one member
    pub fn collapsed(&self, row: usize, col: usize) -> bool {
        self.count(row, col) == 1
    }

    /// The single remaining tile of a collapsed cell
    pub fn collapsed_tile(&self, row: usize, col: usize) -> Option<usize> {
        let set = self.possibilities.get((row, col))?;
        if set.count() == 1 { set.first() } else { None }
    }

    /// Number of collapsed cells
    pub fn collapsed_count(&self) -> usize {
        self.possibilities
            .iter()
            .filter(|set| set.count() == 1)
            .count()
    }

    /// Current support counter for a (cell, tile, direction)
    pub fn support(&self, row: usize, col: usize, tile: usize, direction: Direction) -> u16 {
        self.support
            .get((row, col, tile, direction.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrite a support counter
    pub fn set_support(&mut self, row: usize, col: usize, tile: usize, direction: Direction, value: u16) {
        if let Some(slot) = self.support.get_mut((row, col, tile, direction.index())) {
            *slot = value;
        }
    }

    /// Decrement a support counter, reporting whether it reached zero
    pub fn decrement_support(&mut self, row: usize, col: usize, tile: usize, direction: Direction) -> bool {
        self.support
            .get_mut((row, col, tile, direction.index()))
            .is_some_and(|slot| {
                *slot = slot.saturating_sub(1);
                *slot == 0
            })
    }

    /// Increment a support counter, reporting a zero-to-one transition
    pub fn increment_support(&mut self, row: usize, col: usize, tile: usize, direction: Direction) -> bool {
        self.support
            .get_mut((row, col, tile, direction.index()))
            .is_some_and(|slot| {
                *slot = slot.saturating_add(1);
                *slot == 1
            })
    }
}

/// Synthesis output: one optional tile index per cell
///
/// Partial arrangements leave uncollapsed cells as `None`; the event
/// stream renders those with an empty-string sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arrangement {
    cells: Array2<Option<usize>>,
}

impl Arrangement {
    /// Snapshot the collapsed portion of a grid
    pub fn from_grid(grid: &CellGrid) -> Self {
        let mut cells = Array2::from_elem((grid.rows(), grid.cols()), None);
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                if let Some(slot) = cells.get_mut((row, col)) {
                    *slot = grid.collapsed_tile(row, col);
                }
            }
        }
        Self { cells }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Tile index at a cell, `None` while uncollapsed
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.cells.get((row, col)).copied().flatten()
    }

    /// True iff every cell carries a tile
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of cells carrying a tile
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Render as rows of tile ids, empty string for uncollapsed cells
    pub fn to_id_rows(&self, tiles: &TileSet) -> Vec<Vec<String>> {
        (0..self.rows())
            .map(|row| {
                (0..self.cols())
                    .map(|col| {
                        self.get(row, col)
                            .and_then(|index| tiles.id_of(index))
                            .map_or_else(String::new, str::to_string)
                    })
                    .collect()
            })
            .collect()
    }
}
