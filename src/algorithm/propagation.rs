//! Arc-consistency propagation over the cell grid
//!
//! Removal propagation is driven by support decrements: dropping a tile
//! from a cell withdraws one unit of support from every compatible tile in
//! each neighbor, and a counter reaching zero cascades the removal. Every
//! removal is recorded in an undo batch; the restoration path re-inserts
//! the batch and rebuilds support, returning the grid bit-for-bit to its
//! pre-removal state. Contradictions are a tagged outcome, not an error —
//! the search driver treats them as ordinary control flow.

use crate::algorithm::rules::AdjacencyRules;
use crate::spatial::grid::{CellGrid, Direction};
use std::collections::{HashSet, VecDeque};

/// One recorded possibility removal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removal {
    /// Row of the affected cell
    pub row: usize,
    /// Column of the affected cell
    pub col: usize,
    /// Tile index removed from the cell's possibilities
    pub tile: usize,
}

/// Ordered list of removals produced by one propagation
///
/// Replaying the batch through [`propagate_add`] restores possibilities and
/// support exactly; the backtracking search relies on that identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndoBatch {
    removals: Vec<Removal>,
}

impl UndoBatch {
    /// Create an empty batch
    pub const fn new() -> Self {
        Self {
            removals: Vec::new(),
        }
    }

    /// Record one removal
    pub fn push(&mut self, removal: Removal) {
        self.removals.push(removal);
    }

    /// Append every removal of another batch
    pub fn merge(&mut self, other: Self) {
        self.removals.extend(other.removals);
    }

    /// Iterate recorded removals in application order
    pub fn iter(&self) -> std::slice::Iter<'_, Removal> {
        self.removals.iter()
    }

    /// Number of recorded removals
    pub fn len(&self) -> usize {
        self.removals.len()
    }

    /// Test whether the batch records nothing
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }
}

impl<'a> IntoIterator for &'a UndoBatch {
    type Item = &'a Removal;
    type IntoIter = std::slice::Iter<'a, Removal>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Result of one removal propagation
///
/// The contradiction flag marks that some cell's possibility set emptied;
/// the batch is complete and restorable either way.
#[derive(Clone, Debug)]
pub struct PropagationOutcome {
    /// True when any cell was left with no possibilities
    pub contradiction: bool,
    /// Every removal performed, in order
    pub batch: UndoBatch,
}

/// Remove tiles from a cell and propagate the consequences
///
/// Seeds the removals at `(row, col)`, then drains a work queue of
/// `(cell, removed tiles)` entries. Each removed tile withdraws support
/// from the compatible tiles of every in-bounds neighbor; counters that
/// reach zero cascade. Entries for a neighbor already pending in the queue
/// are coalesced rather than re-enqueued. After the queue drains, support
/// is rebuilt from scratch for every touched cell and its neighbors so the
/// incremental decrements cannot drift.
pub fn propagate_remove(
    grid: &mut CellGrid,
    rules: &AdjacencyRules,
    row: usize,
    col: usize,
    removals: &[usize],
) -> PropagationOutcome {
    let mut batch = UndoBatch::new();
    let mut contradiction = false;
    let mut queue: VecDeque<(usize, usize, Vec<usize>)> = VecDeque::new();

    let mut seeded = Vec::with_capacity(removals.len());
    for &tile in removals {
        if grid.remove_possibility(row, col, tile) {
            batch.push(Removal { row, col, tile });
            seeded.push(tile);
        }
    }
    if grid.count(row, col) == 0 {
        contradiction = true;
    }
    if !seeded.is_empty() {
        queue.push_back((row, col, seeded));
    }

    while let Some((cur_row, cur_col, removed)) = queue.pop_front() {
        for direction in Direction::ALL {
            let Some((n_row, n_col)) = grid.neighbor(cur_row, cur_col, direction) else {
                continue;
            };
            // The neighbor's support axis points back toward the cell the
            // removals came from.
            let toward_source = direction.opposite();

            let mut newly_removed = Vec::new();
            for &tile in &removed {
                let Some(affected) = rules.allowed(tile, direction) else {
                    continue;
                };
                for candidate in affected.iter() {
                    let present = grid
                        .possibilities(n_row, n_col)
                        .is_some_and(|set| set.contains(candidate));
                    if !present {
                        continue;
                    }
                    if grid.decrement_support(n_row, n_col, candidate, toward_source)
                        && grid.remove_possibility(n_row, n_col, candidate)
                    {
                        batch.push(Removal {
                            row: n_row,
                            col: n_col,
                            tile: candidate,
                        });
                        newly_removed.push(candidate);
                        if grid.count(n_row, n_col) == 0 {
                            contradiction = true;
                        }
                    }
                }
            }

            if !newly_removed.is_empty() {
                let pending = queue
                    .iter_mut()
                    .find(|(r, c, _)| *r == n_row && *c == n_col);
                match pending {
                    Some((_, _, tiles)) => tiles.extend(newly_removed),
                    None => queue.push_back((n_row, n_col, newly_removed)),
                }
            }
        }
    }

    recompute_affected_support(grid, rules, &batch);

    PropagationOutcome {
        contradiction,
        batch,
    }
}

/// Restore a previously removed batch
///
/// Re-inserts every recorded possibility, then rebuilds support for every
/// touched cell and its neighbors. Immediately following the producing
/// [`propagate_remove`], this returns the grid to its exact prior state.
pub fn propagate_add(grid: &mut CellGrid, rules: &AdjacencyRules, batch: &UndoBatch) {
    for removal in batch {
        grid.add_possibility(removal.row, removal.col, removal.tile);
    }
    recompute_affected_support(grid, rules, batch);
}

/// Rebuild support counters for every cell in the grid
///
/// Used once per attempt before the first decision; afterwards propagation
/// keeps the counters current for the touched region.
pub fn initialize_support(grid: &mut CellGrid, rules: &AdjacencyRules) {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            recompute_cell_support(grid, rules, row, col);
        }
    }
}

/// Remove tiles the borders can never support, before any decision
///
/// A freshly built grid can already be arc-inconsistent: a tile whose
/// declarations leave it with zero support toward an in-bounds neighbor
/// must go before the first decision is made. Returns a contradiction when
/// the sweep empties a cell, which makes the whole attempt infeasible.
pub fn enforce_initial_consistency(
    grid: &mut CellGrid,
    rules: &AdjacencyRules,
) -> PropagationOutcome {
    initialize_support(grid, rules);

    let mut batch = UndoBatch::new();
    let mut contradiction = false;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let doomed = unsupported_tiles(grid, row, col);
            if doomed.is_empty() {
                continue;
            }
            let outcome = propagate_remove(grid, rules, row, col, &doomed);
            contradiction = contradiction || outcome.contradiction;
            batch.merge(outcome.batch);
        }
    }

    PropagationOutcome {
        contradiction,
        batch,
    }
}

/// Tiles in the cell's possibilities with zero support on an in-bounds side
fn unsupported_tiles(grid: &CellGrid, row: usize, col: usize) -> Vec<usize> {
    let Some(possibilities) = grid.possibilities(row, col) else {
        return Vec::new();
    };
    possibilities
        .iter()
        .filter(|&tile| {
            Direction::ALL.iter().any(|&direction| {
                grid.neighbor(row, col, direction).is_some()
                    && grid.support(row, col, tile, direction) == 0
            })
        })
        .collect()
}

/// Rebuild support for every cell a batch touched, plus their neighbors
///
/// Support of a cell only depends on its neighbors' possibility sets, so
/// the touched cells and their orthogonal neighbors bound the region whose
/// counters can have changed.
fn recompute_affected_support(grid: &mut CellGrid, rules: &AdjacencyRules, batch: &UndoBatch) {
    let mut affected: HashSet<(usize, usize)> = HashSet::new();
    for removal in batch {
        affected.insert((removal.row, removal.col));
        for direction in Direction::ALL {
            if let Some(neighbor) = grid.neighbor(removal.row, removal.col, direction) {
                affected.insert(neighbor);
            }
        }
    }
    for (row, col) in affected {
        recompute_cell_support(grid, rules, row, col);
    }
}

/// Recompute every (tile, direction) support counter of one cell
///
/// Out-of-bounds directions hold zero and are never consulted.
fn recompute_cell_support(grid: &mut CellGrid, rules: &AdjacencyRules, row: usize, col: usize) {
    for tile in 0..grid.tile_count() {
        for direction in Direction::ALL {
            let value = grid.neighbor(row, col, direction).map_or(0, |(n_row, n_col)| {
                let compatible = rules
                    .allowed(tile, direction)
                    .zip(grid.possibilities(n_row, n_col))
                    .map_or(0, |(allowed, possible)| allowed.intersection_count(possible));
                compatible as u16
            });
            grid.set_support(row, col, tile, direction, value);
        }
    }
}
