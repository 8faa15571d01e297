//! Criterion benchmarks for the hedging optimiser.
//!
//! Benchmarks cover:
//! - One training iteration for linear and MLP policies
//! - Policy evaluation on a fixed batch size
//! - Optimiser steps on a large parameter vector

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_models::models::ModelParameters;
use pricer_optimiser::prelude::*;
use pricer_pricing::path_dependent::{OptionType, PayoffSpec};
use pricer_pricing::rng::PricerRng;

fn bench_training_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("training_iteration");
    group.sample_size(10);

    let params = ModelParameters::gbm(100.0, 0.2, 0.01);
    let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
    let policies = [
        ("linear", HedgingPolicy::linear()),
        ("mlp_8", HedgingPolicy::mlp(8, 1).unwrap()),
    ];

    for n_paths in [1_000, 5_000] {
        let config = TrainingConfig::builder()
            .n_paths(n_paths)
            .n_steps(20)
            .max_iterations(1)
            .seed(42)
            .build()
            .unwrap();
        let trainer = HedgeTrainer::new(config);
        for (name, policy) in &policies {
            group.bench_with_input(BenchmarkId::new(*name, n_paths), &n_paths, |b, _| {
                b.iter(|| black_box(trainer.train(&params, &call, policy.clone()).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let params = ModelParameters::gbm(100.0, 0.2, 0.01);
    let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
    let delta = HedgingPolicy::black_scholes(0.2, 0.01, OptionType::Call);
    let config = TrainingConfig::builder()
        .n_paths(10_000)
        .n_steps(50)
        .transaction_cost_rate(0.001)
        .build()
        .unwrap();

    c.bench_function("evaluate_black_scholes_delta_10k_x_50", |b| {
        b.iter(|| {
            let mut rng = PricerRng::from_seed(7);
            black_box(evaluate_policy(&delta, &params, &call, &config, &mut rng).unwrap())
        });
    });
}

fn bench_optimiser_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimiser_step");
    let n = 10_000;
    let grad: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();

    for kind in [OptimizerType::Sgd, OptimizerType::Adam] {
        group.bench_function(kind.as_str(), |b| {
            let mut params = vec![0.0; n];
            let mut opt = kind.build(1e-3, n);
            b.iter(|| opt.step(black_box(&mut params), black_box(&grad)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_training_iteration,
    bench_evaluation,
    bench_optimiser_steps
);
criterion_main!(benches);
