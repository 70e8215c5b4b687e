use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use vivarium_core::brain::{Brain, EvaluateOptions, OutputRegistry, SENSOR_KEYS};
use vivarium_core::genome::{random_genome, random_genome_with_rng};

fn readings(value: f64) -> Vec<(&'static str, f64)> {
    SENSOR_KEYS[1..].iter().map(|&key| (key, value)).collect()
}

/// Benchmark evaluation of one output group with typical inputs.
fn bench_brain_evaluate(c: &mut Criterion) {
    let mut brain = Brain::from_genome(&random_genome(42)).expect("seed genome has genes");
    let inputs = readings(0.5);

    c.bench_function("brain_evaluate", |b| {
        b.iter(|| {
            let result = brain.evaluate(
                black_box("movement"),
                inputs.iter().copied(),
                EvaluateOptions::default(),
            );
            black_box(result)
        })
    });
}

/// Benchmark evaluation with tracing enabled.
fn bench_brain_evaluate_traced(c: &mut Criterion) {
    let mut brain = Brain::from_genome(&random_genome(42)).expect("seed genome has genes");
    let inputs = readings(1.0);

    c.bench_function("brain_evaluate_traced", |b| {
        b.iter(|| {
            let result = brain.evaluate(
                black_box("interaction"),
                inputs.iter().copied(),
                EvaluateOptions::traced(),
            );
            black_box(result)
        })
    });
}

/// Benchmark brain construction from a large genome.
fn bench_brain_creation(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let genome = random_genome_with_rng(&mut rng, OutputRegistry::standard(), 64);

    c.bench_function("brain_creation", |b| {
        b.iter(|| {
            let brain = Brain::from_genome(black_box(&genome));
            black_box(brain)
        })
    });
}

/// Benchmark one evaluate + feedback tick.
fn bench_brain_feedback(c: &mut Criterion) {
    let mut brain = Brain::from_genome(&random_genome(7)).expect("seed genome has genes");
    let inputs = readings(0.25);

    c.bench_function("brain_feedback", |b| {
        b.iter(|| {
            brain.evaluate("movement", inputs.iter().copied(), EvaluateOptions::default());
            let outcome = brain.apply_last_feedback(0.1, 0.05, black_box(0.2), 10.0);
            black_box(outcome)
        })
    });
}

criterion_group!(
    benches,
    bench_brain_evaluate,
    bench_brain_evaluate_traced,
    bench_brain_creation,
    bench_brain_feedback
);
criterion_main!(benches);
