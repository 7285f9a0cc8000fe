//! Performance benchmarks for gesture search and save
//!
//! Vectors use the production size (30 frames × 21 landmarks × 3 coords).
//! Save includes the full backup rewrite, so its cost grows with the store.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use sign_bridge::constants::DEFAULT_VECTOR_SIZE;
use sign_bridge::gesture::{GestureStore, StoreConfig};
use sign_bridge::similarity::cosine_similarity;
use tempfile::TempDir;

/// Helper: deterministic landmark-like vector in [0, 1)
fn landmarks(seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    (0..DEFAULT_VECTOR_SIZE)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f32 / 10_000.0
        })
        .collect()
}

/// Helper: store populated with `count` records over 20 labels
fn setup_store(count: usize) -> (GestureStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = StoreConfig::new(DEFAULT_VECTOR_SIZE, temp_dir.path().join("bench.json"));
    let store = GestureStore::open(config).expect("Failed to open store");
    for i in 0..count {
        store
            .insert(&format!("sign-{}", i % 20), landmarks(i as u64))
            .expect("insert");
    }
    (store, temp_dir)
}

fn bench_cosine(c: &mut Criterion) {
    let a = landmarks(1);
    let b = landmarks(2);
    c.bench_function("cosine_similarity_1890", |bench| {
        bench.iter(|| cosine_similarity(&a, &b))
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_top3");
    for count in [10, 100, 1000] {
        let (store, _dir) = setup_store(count);
        let query = landmarks(u64::MAX);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |bench, _| {
            bench.iter(|| store.search(&query, 3).expect("search"))
        });
    }
    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let (store, _dir) = setup_store(200);
    let query = landmarks(7);
    c.bench_function("predict_200", |bench| {
        bench.iter(|| store.predict(&query).expect("predict"))
    });
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_with_backup");
    for count in [0, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |bench, &count| {
            bench.iter_batched(
                || setup_store(count),
                |(store, dir)| {
                    store.insert("Wave", landmarks(42)).expect("insert");
                    (store, dir)
                },
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .sample_size(30)
        .measurement_time(std::time::Duration::from_secs(5));
    targets =
        bench_cosine,
        bench_search,
        bench_predict,
        bench_save
);

criterion_main!(benches);
