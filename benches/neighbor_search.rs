//! Grid-accelerated neighbor search against the all-pairs reference.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use plexus::spatial::{brute_force_pairs, CellGrid};

fn random_positions(n: usize) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(99);
    (0..n)
        .map(|_| Vec2::new(rng.gen::<f32>() * 1000.0, rng.gen::<f32>() * 1100.0))
        .collect()
}

fn bench_neighbor_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_search");
    for n in [120, 500, 2000] {
        let positions = random_positions(n);

        group.bench_with_input(BenchmarkId::new("grid", n), &positions, |b, positions| {
            let mut grid = CellGrid::new(1000.0, 1100.0, 145.0);
            b.iter(|| {
                grid.rebuild(positions);
                grid.pairs(positions)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("brute_force", n),
            &positions,
            |b, positions| b.iter(|| brute_force_pairs(positions, 145.0)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_neighbor_search);
criterion_main!(benches);
