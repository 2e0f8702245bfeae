//! Input contract validation and adjacency rule semantics

use bordertile::SynthesisError;
use bordertile::algorithm::executor::{CollapseExecutor, SynthesisConfig};
use bordertile::algorithm::rules::{AdjacencyRules, border_compatible};
use bordertile::spatial::grid::Direction;
use bordertile::spatial::tiles::{TileDescriptor, TileSet};

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn tile(
    id: &str,
    north: &[&str],
    east: &[&str],
    south: &[&str],
    west: &[&str],
) -> TileDescriptor {
    TileDescriptor::new(id, 8, 8, [ids(north), ids(east), ids(south), ids(west)])
}

fn tile_set(descriptors: Vec<TileDescriptor>) -> TileSet {
    match TileSet::new(descriptors) {
        Ok(tiles) => tiles,
        Err(err) => unreachable!("test tile set must be valid: {err}"),
    }
}

#[test]
fn test_direction_encoding() {
    assert_eq!(Direction::North.opposite(), Direction::South);
    assert_eq!(Direction::East.opposite(), Direction::West);
    assert_eq!(Direction::West.opposite(), Direction::East);
    assert_eq!(Direction::North.offset(), (-1, 0));
    assert_eq!(Direction::East.offset(), (0, 1));
    for direction in Direction::ALL {
        assert_eq!(
            direction.opposite().index(),
            (direction.index() + 2) % 4
        );
    }
}

#[test]
fn test_either_side_declaration_suffices() {
    // "a" lists "b" on its east side only; "b" lists nothing. The union
    // rule still permits the pair in both reading orders.
    let tiles = tile_set(vec![
        tile("a", &[], &["b"], &[], &[]),
        tile("b", &[], &[], &[], &[]),
    ]);

    assert!(border_compatible(&tiles, 0, 1, Direction::East));
    assert!(border_compatible(&tiles, 1, 0, Direction::West));
    assert!(!border_compatible(&tiles, 0, 1, Direction::West));
    assert!(!border_compatible(&tiles, 0, 1, Direction::North));

    let rules = AdjacencyRules::compile(&tiles);
    assert!(rules.permits(0, Direction::East, 1));
    assert!(rules.permits(1, Direction::West, 0));
    assert!(!rules.permits(1, Direction::East, 0));
}

#[test]
fn test_rule_table_matches_predicate_everywhere() {
    let tiles = tile_set(vec![
        tile("a", &["a"], &["b"], &["c"], &[]),
        tile("b", &[], &["b", "c"], &["a"], &[]),
        tile("c", &["c"], &[], &[], &["a", "b"]),
    ]);
    let rules = AdjacencyRules::compile(&tiles);

    for a in 0..tiles.len() {
        for b in 0..tiles.len() {
            for direction in Direction::ALL {
                assert_eq!(
                    rules.permits(a, direction, b),
                    border_compatible(&tiles, a, b, direction),
                    "table and predicate disagree on ({a},{b},{direction:?})"
                );
            }
        }
    }
}

#[test]
fn test_empty_tile_set_is_rejected() {
    let outcome = TileSet::new(vec![]);
    assert!(matches!(outcome, Err(SynthesisError::EmptyTileSet)));
}

#[test]
fn test_mismatched_geometry_is_rejected() {
    let outcome = TileSet::new(vec![
        TileDescriptor::new("a", 8, 8, [vec![], vec![], vec![], vec![]]),
        TileDescriptor::new("b", 8, 16, [vec![], vec![], vec![], vec![]]),
    ]);
    assert!(matches!(
        outcome,
        Err(SynthesisError::TileGeometryMismatch { .. })
    ));
}

#[test]
fn test_zero_geometry_is_rejected() {
    let outcome = TileSet::new(vec![TileDescriptor::new(
        "a",
        0,
        8,
        [vec![], vec![], vec![], vec![]],
    )]);
    assert!(matches!(
        outcome,
        Err(SynthesisError::InvalidParameter { .. })
    ));
}

#[test]
fn test_duplicate_ids_keep_last_occurrence() {
    let tiles = tile_set(vec![
        tile("x", &["x"], &["x"], &["x"], &["x"]),
        tile("y", &[], &[], &[], &[]),
        tile("x", &[], &["y"], &[], &[]),
    ]);

    assert_eq!(tiles.len(), 2);
    let index = tiles.index_of("x");
    assert_eq!(index, Some(0));
    let Some(descriptor) = index.and_then(|i| tiles.get(i)) else {
        unreachable!("deduplicated set must resolve 'x'")
    };
    assert_eq!(descriptor.border(Direction::East), ids(&["y"]));
    assert!(descriptor.border(Direction::North).is_empty());
}

#[test]
fn test_indivisible_target_is_rejected() {
    let tiles = tile_set(vec![tile("a", &["a"], &["a"], &["a"], &["a"])]);

    let outcome = tiles.grid_dimensions(20, 16);
    assert!(matches!(
        outcome,
        Err(SynthesisError::IndivisibleTarget { axis: "width", .. })
    ));

    let outcome = tiles.grid_dimensions(16, 0);
    assert!(matches!(
        outcome,
        Err(SynthesisError::InvalidParameter { .. })
    ));

    assert!(matches!(tiles.grid_dimensions(24, 16), Ok((2, 3))));
}

#[test]
fn test_config_limits_are_validated() {
    let tiles = tile_set(vec![tile("a", &["a"], &["a"], &["a"], &["a"])]);

    let bad_attempts = SynthesisConfig {
        max_attempts: 0,
        ..SynthesisConfig::default()
    };
    assert!(CollapseExecutor::new(tiles.clone(), 16, 16, bad_attempts).is_err());

    let bad_pool = SynthesisConfig {
        candidate_pool_size: 0,
        ..SynthesisConfig::default()
    };
    assert!(CollapseExecutor::new(tiles.clone(), 16, 16, bad_pool).is_err());

    let starved_iterations = SynthesisConfig {
        max_iterations: Some(1),
        ..SynthesisConfig::default()
    };
    assert!(CollapseExecutor::new(tiles.clone(), 16, 16, starved_iterations).is_err());

    let workable = SynthesisConfig {
        max_iterations: Some(4),
        seed: 1,
        ..SynthesisConfig::default()
    };
    assert!(CollapseExecutor::new(tiles, 16, 16, workable).is_ok());
}
