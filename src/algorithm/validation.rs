//! Post-hoc adjacency checking and compatibility scoring
//!
//! The validator re-walks a finished arrangement against the compiled
//! relation. A correct search never produces a violating success, so this
//! is a defensive check and a test surface, never a steering input.

use crate::algorithm::rules::AdjacencyRules;
use crate::spatial::grid::{Arrangement, Direction};

/// One adjacency the arrangement gets wrong
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdjacencyViolation {
    /// Row of the offending cell
    pub row: usize,
    /// Column of the offending cell
    pub col: usize,
    /// Direction of the offending neighbor
    pub direction: Direction,
    /// Tile at the offending cell
    pub tile: usize,
    /// Tile at the neighbor cell
    pub neighbor: usize,
}

/// In-bounds step from a cell in the given direction
const fn step(
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
    direction: Direction,
) -> Option<(usize, usize)> {
    let (dr, dc) = direction.offset();
    let n_row = row as i64 + dr;
    let n_col = col as i64 + dc;
    if n_row < 0 || n_col < 0 || n_row >= rows as i64 || n_col >= cols as i64 {
        None
    } else {
        Some((n_row as usize, n_col as usize))
    }
}

/// List every in-bounds orthogonal pair violating the relation
///
/// Cells without a tile (partial arrangements) constrain nothing. Each
/// unordered pair is reported once, from its east/south side.
pub fn validate_arrangement(
    arrangement: &Arrangement,
    rules: &AdjacencyRules,
) -> Vec<AdjacencyViolation> {
    let mut violations = Vec::new();

    for row in 0..arrangement.rows() {
        for col in 0..arrangement.cols() {
            let Some(tile) = arrangement.get(row, col) else {
                continue;
            };
            for direction in [Direction::East, Direction::South] {
                let neighbor = step(arrangement.rows(), arrangement.cols(), row, col, direction)
                    .and_then(|(n_row, n_col)| arrangement.get(n_row, n_col));
                let Some(neighbor) = neighbor else {
                    continue;
                };
                if !rules.permits(tile, direction, neighbor) {
                    violations.push(AdjacencyViolation {
                        row,
                        col,
                        direction,
                        tile,
                        neighbor,
                    });
                }
            }
        }
    }

    violations
}

/// Count satisfied ordered directed adjacencies
///
/// Every `(cell, direction)` pair with both tiles present and compatible
/// contributes one, so a satisfied neighborhood counts once per side.
/// Reporting only; the score never guides the search.
pub fn compatibility_score(arrangement: &Arrangement, rules: &AdjacencyRules) -> usize {
    let mut score = 0;

    for row in 0..arrangement.rows() {
        for col in 0..arrangement.cols() {
            let Some(tile) = arrangement.get(row, col) else {
                continue;
            };
            for direction in Direction::ALL {
                let neighbor = step(arrangement.rows(), arrangement.cols(), row, col, direction)
                    .and_then(|(n_row, n_col)| arrangement.get(n_row, n_col));
                if neighbor.is_some_and(|n| rules.permits(tile, direction, n)) {
                    score += 1;
                }
            }
        }
    }

    score
}
