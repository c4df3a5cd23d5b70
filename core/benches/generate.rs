use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use partial_pair_core::*;

const SEED: u64 = 0x5eed;

fn strategies() -> [GenerationStrategy; 2] {
    [
        GenerationStrategy::Standard,
        GenerationStrategy::Weighted { difficulty: 1.5 },
    ]
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for strategy in strategies() {
        for tiles in [MIN_TILES_PER_ROUND, MAX_TILES_PER_ROUND] {
            let request = GenerationRequest::from_config(&GameConfig::new(GameMode::Challenge, tiles));
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), tiles),
                &request,
                |b, request| {
                    let mut generator =
                        Generator::from_strategy(&strategy, ImagePool::reference(), SEED);
                    b.iter(|| black_box(generator.generate(request)));
                },
            );
        }
    }
    group.finish();
}

fn bench_full_round(c: &mut Criterion) {
    c.bench_function("engine.full_round", |b| {
        b.iter_batched(
            || {
                let mut engine = PairEngine::with_clock(
                    EngineOptions::default().with_seed(SEED),
                    ManualClock::new(),
                );
                engine.start_new_game(GameMode::Classic, MAX_TILES_PER_ROUND);
                engine
            },
            |mut engine| {
                let keys: Vec<String> = engine
                    .tiles()
                    .iter()
                    .map(|tile| tile.image_key().to_owned())
                    .collect();
                for (first, key) in keys.iter().enumerate() {
                    if let Some(offset) = keys[first + 1..].iter().position(|other| other == key) {
                        engine.select_tile(first);
                        engine.select_tile(first + 1 + offset);
                    }
                }
                black_box(engine.drain_events().count())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_generate, bench_full_round);
criterion_main!(benches);
