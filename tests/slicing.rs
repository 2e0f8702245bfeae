//! Slicing, border extraction and compositing round-trips

use bordertile::SynthesisError;
use bordertile::io::image::{compose_arrangement, export_arrangement_png, slice_tiles};
use bordertile::spatial::grid::Direction;
use image::{Rgba, RgbaImage};

const TILE: u32 = 4;

/// Source painted from solid tile-sized blocks
fn block_image(colors: &[&[Rgba<u8>]]) -> RgbaImage {
    let rows = colors.len() as u32;
    let cols = colors.first().map_or(0, |row| row.len() as u32);
    RgbaImage::from_fn(cols * TILE, rows * TILE, |x, y| {
        let block_row = (y / TILE) as usize;
        let block_col = (x / TILE) as usize;
        colors
            .get(block_row)
            .and_then(|row| row.get(block_col))
            .copied()
            .unwrap_or(Rgba([0, 0, 0, 255]))
    })
}

const RED: Rgba<u8> = Rgba([200, 30, 30, 255]);
const BLUE: Rgba<u8> = Rgba([30, 30, 200, 255]);

#[test]
fn test_slicing_deduplicates_blocks() {
    let source = block_image(&[&[RED, BLUE, RED, BLUE]]);
    let Ok(sliced) = slice_tiles(&source, TILE, TILE) else {
        unreachable!("divisible source must slice")
    };

    assert_eq!(sliced.len(), 2);
    let first = sliced.descriptors().first();
    assert_eq!(first.map(|tile| tile.id()), Some("tile-0"));
}

#[test]
fn test_solid_blocks_declare_only_themselves() {
    let source = block_image(&[&[RED, BLUE]]);
    let Ok(sliced) = slice_tiles(&source, TILE, TILE) else {
        unreachable!("divisible source must slice")
    };

    // A solid red edge never equals a solid blue edge, so each block's
    // declarations are exactly itself on all four sides.
    for descriptor in sliced.descriptors() {
        for direction in Direction::ALL {
            assert_eq!(
                descriptor.border(direction),
                vec![descriptor.id().to_string()],
                "{} declared a foreign edge on {direction:?}",
                descriptor.id()
            );
        }
    }
}

#[test]
fn test_matching_edges_declare_each_other() {
    // Left block ends in a blue column; right block starts with one. The
    // east/west pair must be declared while the remaining edges differ.
    const GREEN: Rgba<u8> = Rgba([30, 200, 30, 255]);
    let striped_left = RgbaImage::from_fn(TILE, TILE, |x, _| if x == TILE - 1 { BLUE } else { RED });
    let striped_right = RgbaImage::from_fn(TILE, TILE, |x, _| if x == 0 { BLUE } else { GREEN });

    let mut source = RgbaImage::new(TILE * 2, TILE);
    image::imageops::replace(&mut source, &striped_left, 0, 0);
    image::imageops::replace(&mut source, &striped_right, i64::from(TILE), 0);

    let Ok(sliced) = slice_tiles(&source, TILE, TILE) else {
        unreachable!("divisible source must slice")
    };
    assert_eq!(sliced.len(), 2);

    let Some(left) = sliced.descriptors().first() else {
        unreachable!("two blocks expected")
    };
    assert!(left.declares("tile-1", Direction::East));
    assert!(!left.declares("tile-1", Direction::West));
    assert!(!left.declares("tile-1", Direction::North));

    let Some(right) = sliced.descriptors().get(1) else {
        unreachable!("two blocks expected")
    };
    assert!(right.declares("tile-0", Direction::West));
}

#[test]
fn test_indivisible_source_is_rejected() {
    let source = RgbaImage::new(TILE * 2 + 1, TILE);
    let outcome = slice_tiles(&source, TILE, TILE);
    assert!(matches!(
        outcome,
        Err(SynthesisError::IndivisibleTarget { axis: "width", .. })
    ));
}

#[test]
fn test_compose_places_tiles_and_leaves_gaps_transparent() {
    let source = block_image(&[&[RED, BLUE]]);
    let Ok(sliced) = slice_tiles(&source, TILE, TILE) else {
        unreachable!("divisible source must slice")
    };

    let rows = vec![vec!["tile-1".to_string(), String::new()]];
    let Ok(canvas) = compose_arrangement(&rows, &sliced) else {
        unreachable!("known ids must composite")
    };

    assert_eq!(canvas.dimensions(), (TILE * 2, TILE));
    assert_eq!(*canvas.get_pixel(0, 0), BLUE);
    // Sentinel cell stays fully transparent.
    assert_eq!(canvas.get_pixel(TILE, 0).0, [0, 0, 0, 0]);
}

#[test]
fn test_compose_rejects_unknown_ids() {
    let source = block_image(&[&[RED]]);
    let Ok(sliced) = slice_tiles(&source, TILE, TILE) else {
        unreachable!("divisible source must slice")
    };

    let rows = vec![vec!["tile-9".to_string()]];
    let outcome = compose_arrangement(&rows, &sliced);
    assert!(matches!(outcome, Err(SynthesisError::UnknownTile { .. })));
}

#[test]
fn test_export_round_trips_through_png() {
    let source = block_image(&[&[RED, BLUE]]);
    let Ok(sliced) = slice_tiles(&source, TILE, TILE) else {
        unreachable!("divisible source must slice")
    };

    let Ok(dir) = tempfile::tempdir() else {
        unreachable!("temp dir must be creatable")
    };
    let path = dir.path().join("mosaic.png");

    let rows = vec![vec!["tile-0".to_string(), "tile-1".to_string()]];
    assert!(export_arrangement_png(&rows, &sliced, &path).is_ok());

    let Ok(reloaded) = image::open(&path) else {
        unreachable!("exported png must reload")
    };
    let reloaded = reloaded.to_rgba8();
    assert_eq!(reloaded.dimensions(), (TILE * 2, TILE));
    assert_eq!(*reloaded.get_pixel(0, 0), RED);
    assert_eq!(*reloaded.get_pixel(TILE, 0), BLUE);
}
