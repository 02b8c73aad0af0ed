use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mabcalc::{BanditState, RewardBatch, ThompsonAllocator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn bench_thompson_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("thompson_step");
    for &k in &[2usize, 5usize, 10usize] {
        // Spread accuracies so the posterior has something to learn.
        let accs: Vec<f64> = (0..k).map(|i| 0.5 + 0.45 * i as f64 / k as f64).collect();
        let mut env = StdRng::seed_from_u64(7);
        let batch = RewardBatch::generate(&accs, 500, &mut env).unwrap();

        group.bench_with_input(BenchmarkId::new("rows500", k), &k, |b, &k| {
            let mut rng = StdRng::seed_from_u64(123);
            b.iter(|| {
                let out = ThompsonAllocator
                    .allocate(black_box(&batch), BanditState::new(k), &mut rng)
                    .unwrap();
                black_box(out);
            })
        });
    }
    group.finish();
}

fn bench_reward_generation(c: &mut Criterion) {
    let accs = vec![0.9; 10];
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("reward_batch_10x500", |b| {
        b.iter(|| black_box(RewardBatch::generate(black_box(&accs), 500, &mut rng).unwrap()))
    });
}

criterion_group!(benches, bench_thompson_step, bench_reward_generation);
criterion_main!(benches);
