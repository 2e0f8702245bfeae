//! Image slicing, border extraction and arrangement compositing
//!
//! The slicer cuts a source raster into uniform blocks, deduplicates them
//! by pixel content and derives border declarations by exact edge
//! matching: a tile declares another on its east side when its east column
//! of pixels equals the other's west column, and likewise for the other
//! three sides. The compositor renders arrangement rows back into a
//! raster, leaving uncollapsed cells transparent.

use crate::io::error::{Result, SynthesisError, invalid_parameter};
use crate::spatial::grid::Direction;
use crate::spatial::tiles::TileDescriptor;
use image::{Rgba, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Sliced source image: descriptors plus the pixel registry for compositing
#[derive(Clone, Debug)]
pub struct SlicedTiles {
    descriptors: Vec<TileDescriptor>,
    pixels: HashMap<String, RgbaImage>,
    tile_width: u32,
    tile_height: u32,
}

impl SlicedTiles {
    /// Descriptors of the unique tiles, in discovery order
    pub fn descriptors(&self) -> &[TileDescriptor] {
        &self.descriptors
    }

    /// Consume the slice, returning the descriptors
    pub fn into_descriptors(self) -> Vec<TileDescriptor> {
        self.descriptors
    }

    /// Pixel block for a tile id
    pub fn pixels(&self, id: &str) -> Option<&RgbaImage> {
        self.pixels.get(id)
    }

    /// Number of unique tiles discovered
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Test whether slicing discovered no tiles
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Tile width in pixels
    pub const fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Tile height in pixels
    pub const fn tile_height(&self) -> u32 {
        self.tile_height
    }
}

/// Load a source image as RGBA
///
/// # Errors
///
/// Returns an error when the file cannot be opened or decoded.
pub fn load_source_image(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| SynthesisError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Slice a source raster into unique tiles with border declarations
///
/// # Errors
///
/// Returns an error if the tile geometry is zero or the source dimensions
/// are not exact multiples of it.
pub fn slice_tiles(source: &RgbaImage, tile_width: u32, tile_height: u32) -> Result<SlicedTiles> {
    if tile_width == 0 || tile_height == 0 {
        return Err(invalid_parameter(
            "tile geometry",
            &format!("{tile_width}x{tile_height}"),
            &"tile width and height must be positive",
        ));
    }
    if source.width() % tile_width != 0 {
        return Err(SynthesisError::IndivisibleTarget {
            axis: "width",
            target: source.width(),
            tile: tile_width,
        });
    }
    if source.height() % tile_height != 0 {
        return Err(SynthesisError::IndivisibleTarget {
            axis: "height",
            target: source.height(),
            tile: tile_height,
        });
    }

    // Cut blocks and deduplicate by raw pixel content
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    let mut blocks: Vec<RgbaImage> = Vec::new();

    for block_row in 0..source.height() / tile_height {
        for block_col in 0..source.width() / tile_width {
            let block = cut_block(
                source,
                block_col * tile_width,
                block_row * tile_height,
                tile_width,
                tile_height,
            );
            let key = block.as_raw().clone();
            if seen.insert(key) {
                blocks.push(block);
            }
        }
    }

    let ids: Vec<String> = (0..blocks.len())
        .map(|index| format!("tile-{index}"))
        .collect();

    // Border declarations by exact edge matching. Declaring from both
    // sides is redundant under the solver's union rule but keeps the
    // descriptors honest on their own.
    let edges: Vec<[Vec<Rgba<u8>>; 4]> = blocks
        .iter()
        .map(|block| {
            [
                edge_pixels(block, Direction::North),
                edge_pixels(block, Direction::East),
                edge_pixels(block, Direction::South),
                edge_pixels(block, Direction::West),
            ]
        })
        .collect();

    let mut descriptors = Vec::with_capacity(blocks.len());
    for (index, id) in ids.iter().enumerate() {
        let mut borders: [Vec<String>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        for direction in Direction::ALL {
            let own = edges.get(index).and_then(|e| e.get(direction.index()));
            for (other_index, other_id) in ids.iter().enumerate() {
                let facing = edges
                    .get(other_index)
                    .and_then(|e| e.get(direction.opposite().index()));
                if own.is_some() && own == facing {
                    if let Some(list) = borders.get_mut(direction.index()) {
                        list.push(other_id.clone());
                    }
                }
            }
        }
        descriptors.push(TileDescriptor::new(
            id.clone(),
            tile_width,
            tile_height,
            borders,
        ));
    }

    let pixels = ids.into_iter().zip(blocks).collect();

    Ok(SlicedTiles {
        descriptors,
        pixels,
        tile_width,
        tile_height,
    })
}

/// Copy one tile-sized block out of the source
fn cut_block(source: &RgbaImage, x0: u32, y0: u32, width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| *source.get_pixel(x0 + x, y0 + y))
}

/// Pixel run along one edge of a block
///
/// North and south run left to right; east and west top to bottom, so two
/// edges compare equal exactly when the tiles abut seamlessly.
fn edge_pixels(block: &RgbaImage, direction: Direction) -> Vec<Rgba<u8>> {
    match direction {
        Direction::North => (0..block.width()).map(|x| *block.get_pixel(x, 0)).collect(),
        Direction::South => (0..block.width())
            .map(|x| *block.get_pixel(x, block.height() - 1))
            .collect(),
        Direction::West => (0..block.height()).map(|y| *block.get_pixel(0, y)).collect(),
        Direction::East => (0..block.height())
            .map(|y| *block.get_pixel(block.width() - 1, y))
            .collect(),
    }
}

/// Render arrangement rows into a raster
///
/// Cells with the empty-string sentinel stay transparent.
///
/// # Errors
///
/// Returns an error when a non-empty tile id is missing from the registry.
pub fn compose_arrangement(rows: &[Vec<String>], sliced: &SlicedTiles) -> Result<RgbaImage> {
    let grid_rows = rows.len() as u32;
    let grid_cols = rows.first().map_or(0, Vec::len) as u32;
    let mut canvas = RgbaImage::new(
        grid_cols * sliced.tile_width(),
        grid_rows * sliced.tile_height(),
    );

    for (row_index, row) in rows.iter().enumerate() {
        for (col_index, id) in row.iter().enumerate() {
            if id.is_empty() {
                continue;
            }
            let Some(block) = sliced.pixels(id) else {
                return Err(SynthesisError::UnknownTile { id: id.clone() });
            };
            let x0 = col_index as u32 * sliced.tile_width();
            let y0 = row_index as u32 * sliced.tile_height();
            image::imageops::replace(&mut canvas, block, i64::from(x0), i64::from(y0));
        }
    }

    Ok(canvas)
}

/// Composite an arrangement and write it to disk as PNG
///
/// # Errors
///
/// Returns an error when compositing fails or the file cannot be written.
pub fn export_arrangement_png(
    rows: &[Vec<String>],
    sliced: &SlicedTiles,
    path: &Path,
) -> Result<()> {
    let canvas = compose_arrangement(rows, sliced)?;
    canvas
        .save(path)
        .map_err(|source| SynthesisError::ImageExport {
            path: path.to_path_buf(),
            source,
        })
}
