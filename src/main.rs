//! CLI entry point for border-compatible tile mosaic synthesis

use bordertile::io::cli::{Cli, SynthesisRunner};
use clap::Parser;

fn main() -> bordertile::Result<()> {
    let cli = Cli::parse();
    let runner = SynthesisRunner::new(cli);
    runner.run()
}
