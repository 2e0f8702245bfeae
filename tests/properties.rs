//! Property tests: seeded determinism, exact undo and validator cleanliness

use bordertile::algorithm::executor::{CollapseExecutor, SynthesisConfig};
use bordertile::algorithm::propagation::{
    enforce_initial_consistency, propagate_add, propagate_remove,
};
use bordertile::algorithm::rules::AdjacencyRules;
use bordertile::algorithm::validation::validate_arrangement;
use bordertile::io::events::{NullSink, RecordingSink};
use bordertile::spatial::grid::CellGrid;
use bordertile::spatial::tiles::{TileDescriptor, TileSet};
use proptest::prelude::*;

const TILE_PX: u32 = 4;

fn mix(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Pseudorandom border declarations derived from a seed, so proptest can
/// shrink over the whole descriptor space through one integer.
fn random_tile_set(tile_count: usize, borders_seed: u64) -> TileSet {
    let mut state = borders_seed;
    let ids: Vec<String> = (0..tile_count).map(|index| format!("t{index}")).collect();

    let descriptors = ids
        .iter()
        .map(|id| {
            let mut borders: [Vec<String>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
            for side in &mut borders {
                for other in &ids {
                    if mix(&mut state) % 3 == 0 {
                        side.push(other.clone());
                    }
                }
            }
            TileDescriptor::new(id.clone(), TILE_PX, TILE_PX, borders)
        })
        .collect();

    match TileSet::new(descriptors) {
        Ok(tiles) => tiles,
        Err(err) => unreachable!("generated tile set must be valid: {err}"),
    }
}

fn build_executor(tiles: TileSet, rows: usize, cols: usize, seed: u64) -> CollapseExecutor {
    let config = SynthesisConfig {
        max_attempts: 2,
        seed,
        ..SynthesisConfig::default()
    };
    match CollapseExecutor::new(
        tiles,
        cols as u32 * TILE_PX,
        rows as u32 * TILE_PX,
        config,
    ) {
        Ok(executor) => executor,
        Err(err) => unreachable!("generated executor must build: {err}"),
    }
}

proptest! {
    #[test]
    fn prop_remove_then_add_is_identity(
        tile_count in 2usize..5,
        borders_seed in any::<u64>(),
        rows in 1usize..4,
        cols in 1usize..4,
        target_cell in any::<u64>(),
    ) {
        let tiles = random_tile_set(tile_count, borders_seed);
        let rules = AdjacencyRules::compile(&tiles);
        let mut grid = CellGrid::new(rows, cols, tiles.len());
        enforce_initial_consistency(&mut grid, &rules);

        let row = (target_cell as usize) % rows;
        let col = (target_cell as usize / rows) % cols;
        let removals = grid
            .possibilities(row, col)
            .map(bordertile::algorithm::bitset::TileBitset::to_vec)
            .unwrap_or_default();
        prop_assume!(!removals.is_empty());

        // Drop every other possibility of the cell, then restore.
        let keep = removals.len() / 2;
        let dropped: Vec<usize> = removals.iter().skip(keep).copied().collect();
        prop_assume!(!dropped.is_empty());

        let before = grid.clone();
        let outcome = propagate_remove(&mut grid, &rules, row, col, &dropped);
        propagate_add(&mut grid, &rules, &outcome.batch);
        prop_assert_eq!(grid, before);
    }

    #[test]
    fn prop_seeded_synthesis_is_reproducible(
        tile_count in 2usize..5,
        borders_seed in any::<u64>(),
        rows in 1usize..4,
        cols in 1usize..4,
        seed in 1u64..u64::MAX,
    ) {
        let mut first_sink = RecordingSink::new();
        let mut first = build_executor(random_tile_set(tile_count, borders_seed), rows, cols, seed);
        let first_result = first.run(&mut first_sink);

        let mut second_sink = RecordingSink::new();
        let mut second = build_executor(random_tile_set(tile_count, borders_seed), rows, cols, seed);
        let second_result = second.run(&mut second_sink);

        match (first_result, second_result) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "seeded runs diverged in outcome"),
        }
        prop_assert_eq!(first_sink.into_events(), second_sink.into_events());
    }

    #[test]
    fn prop_success_has_zero_violations(
        tile_count in 2usize..5,
        borders_seed in any::<u64>(),
        rows in 1usize..4,
        cols in 1usize..4,
        seed in 1u64..u64::MAX,
    ) {
        let tiles = random_tile_set(tile_count, borders_seed);
        let mut executor = build_executor(tiles, rows, cols, seed);
        let mut sink = NullSink;

        if let Ok(arrangement) = executor.run(&mut sink) {
            prop_assert!(arrangement.is_complete());
            let violations = validate_arrangement(&arrangement, executor.rules());
            prop_assert!(violations.is_empty(), "violations: {:?}", violations);
        }
    }
}
