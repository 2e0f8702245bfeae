//! Tile descriptors and the validated tile set
//!
//! A descriptor carries a unique id, the shared logical geometry and four
//! ordered border lists naming the tiles it declares acceptable on each
//! side. Border lists are asymmetric hints; the rule compiler unions them
//! into a symmetric relation.

use crate::io::error::{Result, SynthesisError, invalid_parameter};
use crate::spatial::grid::Direction;
use std::collections::HashMap;

/// Immutable description of one tile type
///
/// The raw image payload is opaque to the solver; only the id, the shared
/// geometry and the border declarations participate in rule compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileDescriptor {
    id: String,
    width: u32,
    height: u32,
    borders: [Vec<String>; 4],
}

impl TileDescriptor {
    /// Create a descriptor from its id, geometry and border lists
    ///
    /// Border lists are ordered `[north, east, south, west]` to match
    /// [`Direction`] indexing.
    pub fn new(id: impl Into<String>, width: u32, height: u32, borders: [Vec<String>; 4]) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            borders,
        }
    }

    /// Unique identifier of this tile type
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Logical tile width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Logical tile height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tiles this descriptor declares acceptable on the given side
    pub fn border(&self, direction: Direction) -> &[String] {
        self.borders
            .get(direction.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Test whether this tile declares `other` acceptable on `direction`
    pub fn declares(&self, other: &str, direction: Direction) -> bool {
        self.border(direction).iter().any(|id| id == other)
    }
}

/// Validated, index-addressable collection of tile descriptors
///
/// Construction enforces the solver's input contract: a non-empty set with
/// uniform geometry. Duplicate ids are resolved by keeping the last
/// occurrence. Tiles are addressed by dense index everywhere inside the
/// solver; ids only resurface at the event-stream boundary.
#[derive(Clone, Debug)]
pub struct TileSet {
    descriptors: Vec<TileDescriptor>,
    index_by_id: HashMap<String, usize>,
}

impl TileSet {
    /// Build a tile set from descriptors, validating the input contract
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The descriptor list is empty
    /// - Any descriptor has zero width or height
    /// - Descriptors disagree on tile geometry
    pub fn new(descriptors: Vec<TileDescriptor>) -> Result<Self> {
        let Some(first) = descriptors.first() else {
            return Err(SynthesisError::EmptyTileSet);
        };

        let expected = (first.width(), first.height());
        if expected.0 == 0 || expected.1 == 0 {
            return Err(invalid_parameter(
                "tile geometry",
                &format!("{}x{}", expected.0, expected.1),
                &"tile width and height must be positive",
            ));
        }

        for descriptor in &descriptors {
            let found = (descriptor.width(), descriptor.height());
            if found != expected {
                return Err(SynthesisError::TileGeometryMismatch {
                    id: descriptor.id().to_string(),
                    expected,
                    found,
                });
            }
        }

        // Last occurrence wins for duplicate ids
        let mut deduplicated: Vec<TileDescriptor> = Vec::with_capacity(descriptors.len());
        let mut index_by_id = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let existing = index_by_id.get(descriptor.id()).copied();
            match existing {
                Some(index) => {
                    if let Some(slot) = deduplicated.get_mut(index) {
                        *slot = descriptor;
                    }
                }
                None => {
                    index_by_id.insert(descriptor.id().to_string(), deduplicated.len());
                    deduplicated.push(descriptor);
                }
            }
        }

        Ok(Self {
            descriptors: deduplicated,
            index_by_id,
        })
    }

    /// Number of distinct tile types
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Test whether the set contains no tiles
    ///
    /// Construction rejects empty input, so this is false for any built set.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptor at the given dense index
    pub fn get(&self, index: usize) -> Option<&TileDescriptor> {
        self.descriptors.get(index)
    }

    /// Dense index of the tile with the given id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Id of the tile at the given dense index
    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.descriptors.get(index).map(TileDescriptor::id)
    }

    /// Shared tile width in pixels
    pub fn tile_width(&self) -> u32 {
        self.descriptors.first().map_or(0, TileDescriptor::width)
    }

    /// Shared tile height in pixels
    pub fn tile_height(&self) -> u32 {
        self.descriptors.first().map_or(0, TileDescriptor::height)
    }

    /// Iterate descriptors in dense-index order
    pub fn iter(&self) -> std::slice::Iter<'_, TileDescriptor> {
        self.descriptors.iter()
    }

    /// Derive grid cell dimensions from target pixel dimensions
    ///
    /// Both quotients must be exact; a remainder means the caller sliced the
    /// target with the wrong tile geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if either target dimension is zero or not an exact
    /// multiple of the corresponding tile dimension.
    pub fn grid_dimensions(&self, target_width: u32, target_height: u32) -> Result<(usize, usize)> {
        if target_width == 0 || target_height == 0 {
            return Err(invalid_parameter(
                "target dimensions",
                &format!("{target_width}x{target_height}"),
                &"target width and height must be positive",
            ));
        }

        let tile_width = self.tile_width();
        let tile_height = self.tile_height();

        if target_width % tile_width != 0 {
            return Err(SynthesisError::IndivisibleTarget {
                axis: "width",
                target: target_width,
                tile: tile_width,
            });
        }
        if target_height % tile_height != 0 {
            return Err(SynthesisError::IndivisibleTarget {
                axis: "height",
                target: target_height,
                tile: tile_height,
            });
        }

        Ok((
            (target_height / tile_height) as usize,
            (target_width / tile_width) as usize,
        ))
    }
}

impl<'a> IntoIterator for &'a TileSet {
    type Item = &'a TileDescriptor;
    type IntoIter = std::slice::Iter<'a, TileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
