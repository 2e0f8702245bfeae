//! Benchmarks for rule compilation and full grid synthesis

use bordertile::algorithm::executor::{CollapseExecutor, SynthesisConfig};
use bordertile::algorithm::rules::AdjacencyRules;
use bordertile::io::events::NullSink;
use bordertile::spatial::tiles::{TileDescriptor, TileSet};
use criterion::{Criterion, criterion_group, criterion_main};

const TILE_PX: u32 = 4;

/// Ring of tiles where each tolerates itself and its two ring neighbors
fn ring_tile_set(tile_count: usize) -> TileSet {
    let ids: Vec<String> = (0..tile_count).map(|index| format!("t{index}")).collect();
    let descriptors = (0..tile_count)
        .map(|index| {
            let permitted: Vec<String> = [
                index,
                (index + 1) % tile_count,
                (index + tile_count - 1) % tile_count,
            ]
            .iter()
            .filter_map(|&other| ids.get(other).cloned())
            .collect();
            TileDescriptor::new(
                ids.get(index).cloned().unwrap_or_default(),
                TILE_PX,
                TILE_PX,
                [
                    permitted.clone(),
                    permitted.clone(),
                    permitted.clone(),
                    permitted,
                ],
            )
        })
        .collect();

    match TileSet::new(descriptors) {
        Ok(tiles) => tiles,
        Err(err) => unreachable!("bench tile set must be valid: {err}"),
    }
}

fn bench_rule_compilation(c: &mut Criterion) {
    let tiles = ring_tile_set(128);
    c.bench_function("compile_rules_128_tiles", |b| {
        b.iter(|| AdjacencyRules::compile(&tiles));
    });
}

fn bench_full_synthesis(c: &mut Criterion) {
    c.bench_function("synthesize_16x16_ring_of_8", |b| {
        b.iter(|| {
            let config = SynthesisConfig {
                seed: 7,
                ..SynthesisConfig::default()
            };
            let mut executor = match CollapseExecutor::new(
                ring_tile_set(8),
                16 * TILE_PX,
                16 * TILE_PX,
                config,
            ) {
                Ok(executor) => executor,
                Err(err) => unreachable!("bench executor must build: {err}"),
            };
            let mut sink = NullSink;
            executor.run(&mut sink)
        });
    });
}

criterion_group!(benches, bench_rule_compilation, bench_full_synthesis);
criterion_main!(benches);
