//! HNSW vs brute-force benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use book_recommender::{
    EmbeddingStore, FlatIndex, HnswIndex, HnswParams, SimilarityIndex, Vector,
};

fn create_random_store(n: usize, dim: usize) -> EmbeddingStore {
    EmbeddingStore::from_rows(
        (0..n)
            .map(|_| (0..dim).map(|_| rand::random::<f32>() - 0.5).collect())
            .collect(),
    )
    .unwrap()
}

fn benchmark_hnsw_vs_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_vs_flat");
    group.sample_size(20);

    for &size in &[1_000, 10_000] {
        let dim = 64;
        let store = create_random_store(size, dim);
        let query = Vector::new(vec![0.5; dim]);

        let flat = FlatIndex::build(&store, ()).unwrap();
        let hnsw = HnswIndex::build(&store, HnswParams::new(16, 200, 50)).unwrap();

        group.bench_with_input(BenchmarkId::new("flat", size), &size, |b, _| {
            b.iter(|| flat.query(black_box(&query), black_box(10)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("hnsw", size), &size, |b, _| {
            b.iter(|| hnsw.query(black_box(&query), black_box(10)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_hnsw_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_build");
    group.sample_size(10);

    let store = create_random_store(1_000, 64);

    group.bench_function("build_1000_64d", |b| {
        b.iter(|| HnswIndex::build(black_box(&store), HnswParams::new(16, 200, 50)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_hnsw_vs_flat, benchmark_hnsw_build);
criterion_main!(benches);
