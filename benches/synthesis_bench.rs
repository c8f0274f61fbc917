//! Criterion benchmarks for kernel stepping and population evolution.
//!
//! Uses the built-in exponential reference problem to measure stepping,
//! evaluation, and full generational-loop cost across kernel orders.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rkforge::random::create_rng;
use rkforge::{Kernel, Population, PopulationConfig, TestProblem};

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_kernel_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_step");
    group.sample_size(10);

    let f = |y: &[f64]| y.to_vec();
    for &order in &[2usize, 4, 8, 16] {
        let mut rng = create_rng(42);
        let kernel = Kernel::random(order, &mut rng);
        let y = vec![1.0];
        group.bench_with_input(BenchmarkId::from_parameter(order), &kernel, |b, k| {
            b.iter(|| {
                let next = k.step(black_box(&y), &f, 0.1);
                black_box(next)
            })
        });
    }
    group.finish();
}

fn bench_kernel_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_evaluate");
    group.sample_size(10);

    let problem = TestProblem::exponential();
    for &order in &[2usize, 4, 8] {
        let mut rng = create_rng(42);
        let kernel = Kernel::random(order, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(order), &kernel, |b, k| {
            b.iter(|| {
                let fitness = k.evaluate(black_box(&problem));
                black_box(fitness)
            })
        });
    }
    group.finish();
}

fn bench_population_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_evolve");
    group.sample_size(10);

    let problem = TestProblem::exponential();
    for (pop, order, gens) in [(20usize, 4usize, 10usize), (50, 4, 10), (20, 8, 10)] {
        let config = PopulationConfig::default()
            .with_population_size(pop)
            .with_kernel_order(order);
        group.bench_with_input(
            BenchmarkId::new(format!("p{}_o{}_g{}", pop, order, gens), pop),
            &config,
            |b, cfg| {
                b.iter(|| {
                    let mut rng = create_rng(42);
                    let mut population = Population::with_config(cfg, &mut rng);
                    for _ in 0..gens {
                        population.evolve(black_box(&problem), 3, &mut rng);
                    }
                    black_box(population.best_fitness())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_kernel_step,
    bench_kernel_evaluate,
    bench_population_evolve
);
criterion_main!(benches);
