//! Command-line interface for the slice → solve → composite pipeline

use crate::algorithm::executor::{CollapseExecutor, SynthesisConfig};
use crate::io::configuration::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TILE_SIZE, OUTPUT_SUFFIX, UNSEEDED,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::events::NullSink;
use crate::io::image::{export_arrangement_png, load_source_image, slice_tiles};
use crate::io::progress::ProgressSink;
use crate::spatial::grid::Arrangement;
use crate::spatial::tiles::TileSet;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bordertile")]
#[command(
    author,
    version,
    about = "Synthesize border-compatible tile mosaics from a sliced source image"
)]
/// Command-line arguments for the synthesis tool
pub struct Cli {
    /// Source image to slice into tiles
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Tile width in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_width: u32,

    /// Tile height in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_height: u32,

    /// Output width in pixels (defaults to the source width)
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Output height in pixels (defaults to the source height)
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Random seed for reproducible synthesis (0 draws one from the OS)
    #[arg(short, long, default_value_t = UNSEEDED)]
    pub seed: u64,

    /// Maximum restart attempts before giving up
    #[arg(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: usize,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Runs the single-image synthesis pipeline
pub struct SynthesisRunner {
    cli: Cli,
}

impl SynthesisRunner {
    /// Create a runner from parsed arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Slice the source, solve, and write the composited result
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or sliced, the
    /// synthesis fails terminally, or the result cannot be written.
    pub fn run(&self) -> Result<()> {
        let source = load_source_image(&self.cli.source)?;
        let sliced = slice_tiles(&source, self.cli.tile_width, self.cli.tile_height)?;
        if sliced.is_empty() {
            return Err(invalid_parameter(
                "source",
                &self.cli.source.display(),
                &"source image yielded no tiles",
            ));
        }

        let target_width = self.cli.width.unwrap_or(source.width());
        let target_height = self.cli.height.unwrap_or(source.height());

        let tiles = TileSet::new(sliced.descriptors().to_vec())?;
        let config = SynthesisConfig {
            max_attempts: self.cli.attempts,
            seed: self.cli.seed,
            ..SynthesisConfig::default()
        };

        let mut executor = CollapseExecutor::new(tiles, target_width, target_height, config)?;

        let arrangement = if self.cli.should_show_progress() {
            let mut sink = ProgressSink::new(executor.grid_rows() * executor.grid_cols());
            let outcome = executor.run(&mut sink);
            sink.finish();
            outcome?
        } else {
            let mut sink = NullSink;
            executor.run(&mut sink)?
        };

        self.export(&arrangement, &executor, &sliced)
    }

    fn export(
        &self,
        arrangement: &Arrangement,
        executor: &CollapseExecutor,
        sliced: &crate::io::image::SlicedTiles,
    ) -> Result<()> {
        let rows = arrangement.to_id_rows(executor.tiles());
        let output_path = Self::output_path(&self.cli.source);
        export_arrangement_png(&rows, sliced, &output_path)
    }

    fn output_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{}.png", stem.to_string_lossy(), OUTPUT_SUFFIX);

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}
