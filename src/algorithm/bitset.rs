use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset over dense tile indices
///
/// Backs both the per-cell possibility sets and the compiled rule table.
/// Provides O(1) membership testing and popcount-based cardinality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileBitset {
    bits: BitVec,
    tile_count: usize,
}

impl TileBitset {
    /// Create a bitset with no tiles present
    pub fn new(tile_count: usize) -> Self {
        Self {
            bits: bitvec![0; tile_count],
            tile_count,
        }
    }

    /// Create a bitset containing every tile index
    pub fn all(tile_count: usize) -> Self {
        Self {
            bits: bitvec![1; tile_count],
            tile_count,
        }
    }

    /// Insert a tile index
    pub fn insert(&mut self, tile: usize) {
        if tile < self.tile_count {
            self.bits.set(tile, true);
        }
    }

    /// Remove a tile index, reporting whether it was present
    pub fn remove(&mut self, tile: usize) -> bool {
        if tile < self.tile_count && self.contains(tile) {
            self.bits.set(tile, false);
            true
        } else {
            false
        }
    }

    /// Test tile membership
    pub fn contains(&self, tile: usize) -> bool {
        self.bits.get(tile).as_deref() == Some(&true)
    }

    /// Test if no tiles are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count tiles in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Capacity of the index space
    pub const fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Smallest tile index present
    pub fn first(&self) -> Option<usize> {
        self.bits.first_one()
    }

    /// Iterate present tile indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Extract all present tile indices as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }

    /// Count members shared with another set
    pub fn intersection_count(&self, other: &Self) -> usize {
        self.bits.iter_ones().filter(|&tile| other.contains(tile)).count()
    }
}

impl fmt::Display for TileBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileBitset({} tiles: {:?})", self.count(), self.to_vec())
    }
}
