//! Decision-cell selection and candidate tile choice
//!
//! The selector prefers the uncollapsed cell with the fewest remaining
//! possibilities. Ties are ranked by a deterministic position/seed hash,
//! and the final pick is drawn from a small pool of the lowest-entropy
//! cells to add exploration diversity. The pool grows when the search
//! driver reports contradiction pressure.

use crate::algorithm::bitset::TileBitset;
use crate::spatial::grid::CellGrid;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded random selector for reproducible stochastic choices
#[derive(Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform choice of an index below `len`
    ///
    /// Returns 0 for an empty range so callers can treat the result as an
    /// index into a non-empty slice they validated themselves.
    pub fn uniform_choice(&mut self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            self.rng.random_range(0..len)
        }
    }
}

/// Outcome of asking the selector for the next decision cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellChoice {
    /// Every cell is collapsed
    Complete,
    /// An uncollapsed cell has no possibilities left; backtrack before
    /// issuing any further decision
    Contradiction(usize, usize),
    /// Cell chosen for the next decision
    Decided(usize, usize),
}

/// Pick the next decision cell by minimum entropy
///
/// Scans every uncollapsed cell for the smallest possibility count, ranks
/// the minimum-count cells by [`position_rank`], and draws uniformly from
/// the first `pool_size` of that ranking. A zero-count cell short-circuits
/// as a latent contradiction from earlier propagation.
pub fn select_decision_cell(
    grid: &CellGrid,
    pool_size: usize,
    seed: u64,
    iteration: usize,
    selector: &mut RandomSelector,
) -> CellChoice {
    let mut minimum = usize::MAX;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let count = grid.count(row, col);
            if count == 0 {
                return CellChoice::Contradiction(row, col);
            }
            if count > 1 && count < minimum {
                minimum = count;
            }
        }
    }

    if minimum == usize::MAX {
        return CellChoice::Complete;
    }

    let mut candidates: Vec<(u64, usize, usize)> = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if grid.count(row, col) == minimum {
                candidates.push((position_rank(row, col, seed, iteration), row, col));
            }
        }
    }
    candidates.sort_unstable();

    let pool = pool_size.clamp(1, candidates.len());
    let picked = selector.uniform_choice(pool);
    candidates
        .get(picked)
        .map_or(CellChoice::Complete, |&(_, row, col)| {
            CellChoice::Decided(row, col)
        })
}

/// Choose a candidate tile from a cell's possibility set
///
/// Uniform over the remaining possibilities through the seeded selector,
/// so a fixed seed replays the same choice sequence.
pub fn choose_candidate(
    possibilities: &TileBitset,
    selector: &mut RandomSelector,
) -> Option<usize> {
    let tiles = possibilities.to_vec();
    if tiles.is_empty() {
        return None;
    }
    let picked = selector.uniform_choice(tiles.len());
    tiles.get(picked).copied()
}

/// Deterministic tie-break rank for a cell position
///
/// SplitMix64-style mixing of position, seed and iteration; equal inputs
/// rank equally on every run, which keeps seeded syntheses reproducible.
pub const fn position_rank(row: usize, col: usize, seed: u64, iteration: usize) -> u64 {
    let mut state = (row as u64)
        .wrapping_mul(0x9e37_79b9_7f4a_7c15)
        .wrapping_add((col as u64).wrapping_mul(0xbf58_476d_1ce4_e5b9))
        .wrapping_add(seed)
        .wrapping_add((iteration as u64).wrapping_mul(0x94d0_49bb_1331_11eb));
    state ^= state >> 30;
    state = state.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    state ^= state >> 27;
    state = state.wrapping_mul(0x94d0_49bb_1331_11eb);
    state ^ (state >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_rank_is_stable() {
        assert_eq!(position_rank(3, 5, 42, 7), position_rank(3, 5, 42, 7));
        assert_ne!(position_rank(3, 5, 42, 7), position_rank(5, 3, 42, 7));
    }

    #[test]
    fn test_zero_count_cell_reports_contradiction() {
        let mut grid = CellGrid::new(1, 2, 2);
        grid.remove_possibility(0, 1, 0);
        grid.remove_possibility(0, 1, 1);

        let mut selector = RandomSelector::new(1);
        let choice = select_decision_cell(&grid, 3, 1, 0, &mut selector);
        assert_eq!(choice, CellChoice::Contradiction(0, 1));
    }

    #[test]
    fn test_fully_collapsed_grid_is_complete() {
        let mut grid = CellGrid::new(1, 2, 2);
        grid.remove_possibility(0, 0, 1);
        grid.remove_possibility(0, 1, 0);

        let mut selector = RandomSelector::new(1);
        let choice = select_decision_cell(&grid, 3, 1, 0, &mut selector);
        assert_eq!(choice, CellChoice::Complete);
    }
}
