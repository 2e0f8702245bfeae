//! Error types for synthesis operations
//!
//! Contradictions during search are not errors; they are tagged outcomes
//! of propagation handled inside the driver. Only input rejection and
//! terminal synthesis failure reach a caller through this type.

use std::fmt;
use std::path::PathBuf;

/// Main error type for all synthesis operations
#[derive(Debug)]
pub enum SynthesisError {
    /// Failed to load the source image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a composited arrangement to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// The tile descriptor list was empty
    EmptyTileSet,

    /// A descriptor disagrees with the set's shared tile geometry
    TileGeometryMismatch {
        /// Id of the offending descriptor
        id: String,
        /// Geometry shared by the rest of the set (width, height)
        expected: (u32, u32),
        /// Geometry the descriptor carries (width, height)
        found: (u32, u32),
    },

    /// A target dimension is not an exact multiple of the tile dimension
    IndivisibleTarget {
        /// Which axis failed ("width" or "height")
        axis: &'static str,
        /// Requested target size in pixels
        target: u32,
        /// Tile size in pixels on that axis
        tile: u32,
    },

    /// Configuration or input parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A tile id had no entry in the pixel registry during compositing
    UnknownTile {
        /// The unresolvable tile id
        id: String,
    },

    /// Every attempt was exhausted without a complete arrangement
    Unsolvable {
        /// Number of attempts made
        attempts: usize,
        /// Iterations spent in the final attempt
        iterations: usize,
    },

    /// The host cancelled the synthesis through the event sink
    Cancelled,

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::EmptyTileSet => {
                write!(f, "Tile set is empty: synthesis needs at least one tile")
            }
            Self::TileGeometryMismatch {
                id,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Tile '{id}' is {}x{} but the set uses {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            Self::IndivisibleTarget { axis, target, tile } => {
                write!(
                    f,
                    "Target {axis} {target} is not an exact multiple of the tile {axis} {tile}"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::UnknownTile { id } => {
                write!(f, "Tile id '{id}' has no pixel data in the registry")
            }
            Self::Unsolvable {
                attempts,
                iterations,
            } => {
                write!(
                    f,
                    "No border-compatible arrangement found after {attempts} attempts \
                     ({iterations} iterations in the last)"
                )
            }
            Self::Cancelled => {
                write!(f, "Synthesis cancelled by the host")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for synthesis results
pub type Result<T> = std::result::Result<T, SynthesisError>;

impl From<std::io::Error> for SynthesisError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SynthesisError {
    SynthesisError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
