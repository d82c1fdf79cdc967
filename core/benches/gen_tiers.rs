use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sweeper_core::*;

fn center(config: GameConfig) -> Coord2 {
    (config.rows() / 2, config.cols() / 2)
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for tier in Tier::ALL {
        let config = tier.config();
        for zone in [SafeZone::Cell, SafeZone::RowAndColumn] {
            let id = BenchmarkId::new(tier.name(), format!("{zone:?}"));
            group.bench_with_input(id, &config, |b, &config| {
                let mut seed = 0;
                b.iter(|| {
                    seed += 1;
                    let generator = RandomMinefieldGenerator::new(seed, zone);
                    black_box(generator.generate(config, center(config)))
                });
            });
        }
    }
    group.finish();
}

fn bench_first_reveal(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_reveal");
    for tier in Tier::ALL {
        let config = tier.config();
        group.bench_with_input(tier.name(), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let generator = RandomMinefieldGenerator::new(seed, SafeZone::default());
                let mut game = BoardState::new(config, generator);
                black_box(game.reveal(center(config)))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_first_reveal);
criterion_main!(benches);
