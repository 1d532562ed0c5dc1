// Criterion benchmarks for Santa Algo

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use santa_algo::core::{max_matching_size, ExclusionSet, Matcher, MatcherSettings};

/// Partners excluded from each other, like a party of couples
fn couples(n: u32) -> ExclusionSet<u32> {
    let mut set = ExclusionSet::new();
    for a in (0..n.saturating_sub(1)).step_by(2) {
        set.add(a, a + 1).unwrap();
    }
    set
}

/// Everything excluded except neighbours on a circle
fn ring_only(n: u32) -> ExclusionSet<u32> {
    let mut set = ExclusionSet::new();
    for a in 0..n {
        for b in (a + 1)..n {
            if b != a + 1 && !(a == 0 && b == n - 1) {
                set.add(a, b).unwrap();
            }
        }
    }
    set
}

fn bench_sparse_exclusions(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_couples");
    let matcher = Matcher::default();

    for n in [10u32, 50, 200] {
        let people: Vec<u32> = (0..n).collect();
        let exclusions = couples(n);
        let mut rng = StdRng::seed_from_u64(1);

        group.bench_with_input(BenchmarkId::from_parameter(n), &people, |b, people| {
            b.iter(|| {
                matcher
                    .assign_with_rng(black_box(people), |x, y| exclusions.is_excluded(x, y), &mut rng)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_dense_exclusions(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_ring_only");

    for shuffle_attempts in [0usize, 1000] {
        let matcher = Matcher::new(MatcherSettings { shuffle_attempts });
        let n = 60u32;
        let people: Vec<u32> = (0..n).collect();
        let exclusions = ring_only(n);
        let mut rng = StdRng::seed_from_u64(2);

        group.bench_with_input(
            BenchmarkId::new("shuffles", shuffle_attempts),
            &people,
            |b, people| {
                b.iter(|| {
                    matcher
                        .assign_with_rng(black_box(people), |x, y| exclusions.is_excluded(x, y), &mut rng)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_infeasible(c: &mut Criterion) {
    // Path on an odd number of participants: no valid draw exists
    let n = 62u32;
    let people: Vec<u32> = (0..n - 1).collect();
    let mut exclusions = ring_only(n);
    exclusions.add(0, n - 1).unwrap();

    c.bench_function("max_matching_odd_path_61", |b| {
        b.iter(|| max_matching_size(black_box(&people), |x, y| exclusions.is_excluded(x, y)));
    });
}

criterion_group!(
    benches,
    bench_sparse_exclusions,
    bench_dense_exclusions,
    bench_infeasible
);

criterion_main!(benches);
