use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use titan_tactics::card::CardDatabase;
use titan_tactics::config::EngineConfig;
use titan_tactics::game::GameSetup;
use titan_tactics::simulation::engine::run_game;

fn benchmark_single_game(c: &mut Criterion) {
    let db = Arc::new(CardDatabase::builtin().expect("Failed to load cards"));
    let config = EngineConfig::default();

    c.bench_function("single_game_seed_12345", |b| {
        b.iter(|| {
            run_game(
                db.clone(),
                black_box(&config),
                GameSetup::new("pyra", "thalassa"),
                black_box(12345),
                false,
            )
        })
    });
}

fn benchmark_multiple_games(c: &mut Criterion) {
    let db = Arc::new(CardDatabase::builtin().expect("Failed to load cards"));
    let config = EngineConfig::default();

    c.bench_function("100_games", |b| {
        b.iter(|| {
            for seed in 0..100 {
                let setup = GameSetup::new("sylvara", "morthis").map((seed % 3) as usize);
                let _ = run_game(db.clone(), &config, setup, black_box(seed), false);
            }
        })
    });
}

fn benchmark_catalog_loading(c: &mut Criterion) {
    c.bench_function("load_builtin_catalog", |b| b.iter(CardDatabase::builtin));
}

criterion_group!(
    benches,
    benchmark_single_game,
    benchmark_multiple_games,
    benchmark_catalog_loading
);
criterion_main!(benches);
