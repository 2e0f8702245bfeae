//! Adjacency rule compilation
//!
//! Border lists are asymmetric hints: either side declaring the other is
//! enough to make a pair compatible. The compiler folds that union into a
//! dense `allowed[tile][direction]` bitset table so propagation never
//! touches tile ids again.

use crate::algorithm::bitset::TileBitset;
use crate::spatial::grid::Direction;
use crate::spatial::tiles::TileSet;

/// Symmetric border-compatibility predicate
///
/// `a` may sit next to `b` across `direction` (read from `a` toward `b`)
/// iff `a` declares `b` on that side or `b` declares `a` on the opposite
/// side. Out-of-range indices are incompatible.
pub fn border_compatible(tiles: &TileSet, a: usize, b: usize, direction: Direction) -> bool {
    let (Some(tile_a), Some(tile_b)) = (tiles.get(a), tiles.get(b)) else {
        return false;
    };
    tile_a.declares(tile_b.id(), direction)
        || tile_b.declares(tile_a.id(), direction.opposite())
}

/// Compiled lookup from (tile, direction) to the set of permitted neighbors
///
/// Immutable after construction; one table serves a whole synthesis and may
/// be shared across concurrent syntheses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyRules {
    allowed: Vec<[TileBitset; 4]>,
    tile_count: usize,
}

impl AdjacencyRules {
    /// Compile the rule table from a tile set
    ///
    /// Enumerates every ordered pair per direction, `O(T² · 4)`, which is
    /// acceptable for the few hundred tiles a sliced source image yields.
    pub fn compile(tiles: &TileSet) -> Self {
        let tile_count = tiles.len();
        let mut allowed = Vec::with_capacity(tile_count);

        for a in 0..tile_count {
            let mut row = [
                TileBitset::new(tile_count),
                TileBitset::new(tile_count),
                TileBitset::new(tile_count),
                TileBitset::new(tile_count),
            ];
            for direction in Direction::ALL {
                for b in 0..tile_count {
                    if border_compatible(tiles, a, b, direction) {
                        if let Some(set) = row.get_mut(direction.index()) {
                            set.insert(b);
                        }
                    }
                }
            }
            allowed.push(row);
        }

        Self { allowed, tile_count }
    }

    /// Number of tile types the table covers
    pub const fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Tiles permitted in the neighbor cell on side `direction` of `tile`
    pub fn allowed(&self, tile: usize, direction: Direction) -> Option<&TileBitset> {
        self.allowed
            .get(tile)?
            .get(direction.index())
    }

    /// Test whether `neighbor` may sit on side `direction` of `tile`
    pub fn permits(&self, tile: usize, direction: Direction, neighbor: usize) -> bool {
        self.allowed(tile, direction)
            .is_some_and(|set| set.contains(neighbor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::tiles::TileDescriptor;

    fn descriptor(id: &str, borders: [Vec<String>; 4]) -> TileDescriptor {
        TileDescriptor::new(id, 8, 8, borders)
    }

    #[test]
    fn test_one_sided_declaration_is_symmetric() {
        // Only "a" declares "b" on its east side; the union rule must make
        // the pair compatible from both ends.
        let Ok(tiles) = TileSet::new(vec![
            descriptor("a", [vec![], vec!["b".to_string()], vec![], vec![]]),
            descriptor("b", [vec![], vec![], vec![], vec![]]),
        ]) else {
            unreachable!("two uniform descriptors form a valid tile set")
        };

        let rules = AdjacencyRules::compile(&tiles);
        assert!(rules.permits(0, Direction::East, 1));
        assert!(rules.permits(1, Direction::West, 0));
        assert!(!rules.permits(0, Direction::West, 1));
        assert!(!rules.permits(0, Direction::North, 1));
    }

    #[test]
    fn test_compilation_is_pure() {
        let build = || {
            TileSet::new(vec![
                descriptor(
                    "x",
                    [
                        vec!["x".to_string(), "y".to_string()],
                        vec!["y".to_string()],
                        vec![],
                        vec!["x".to_string()],
                    ],
                ),
                descriptor("y", [vec![], vec![], vec!["x".to_string()], vec![]]),
            ])
            .ok()
        };
        let (Some(first), Some(second)) = (build(), build()) else {
            unreachable!("two uniform descriptors form a valid tile set")
        };
        assert_eq!(
            AdjacencyRules::compile(&first),
            AdjacencyRules::compile(&second)
        );
    }
}
