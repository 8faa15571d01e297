//! Criterion benchmarks for the pricing engine.
//!
//! Benchmarks cover:
//! - Draw generation (plain and antithetic)
//! - European and path-dependent pricing with varying path counts
//! - Greeks by dual numbers vs bump-and-reprice

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_models::models::ModelParameters;
use pricer_pricing::greeks::Greek;
use pricer_pricing::mc::{GreekMode, MonteCarloConfig, PricingEngine};
use pricer_pricing::path_dependent::{Averaging, BarrierType, OptionType, PayoffSpec};
use pricer_pricing::rng::{DrawSet, PricerRng};

fn engine(n_paths: usize, n_steps: usize, mode: GreekMode) -> PricingEngine {
    let config = MonteCarloConfig::builder()
        .n_paths(n_paths)
        .n_steps(n_steps)
        .seed(42)
        .antithetic(true)
        .greek_mode(mode)
        .smoothing_width(0.5)
        .build()
        .unwrap();
    PricingEngine::new(config).unwrap()
}

/// Benchmark draw generation.
fn bench_draws(c: &mut Criterion) {
    let mut group = c.benchmark_group("draws");

    for antithetic in [false, true] {
        group.bench_with_input(
            BenchmarkId::new("generate_10k_x_50", antithetic),
            &antithetic,
            |b, &antithetic| {
                let mut rng = PricerRng::from_seed(42);
                b.iter(|| black_box(DrawSet::generate(&mut rng, 10_000, 50, 1, antithetic)));
            },
        );
    }

    group.finish();
}

/// Benchmark pricing with varying path counts.
fn bench_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pricing");
    group.sample_size(20);

    let params = ModelParameters::gbm(100.0, 0.2, 0.05);
    let payoffs = [
        ("european", PayoffSpec::european(OptionType::Call, 100.0, 1.0)),
        (
            "asian",
            PayoffSpec::asian(Averaging::Arithmetic, OptionType::Call, 100.0, 1.0),
        ),
        (
            "barrier",
            PayoffSpec::barrier(BarrierType::UpOut, 130.0, OptionType::Call, 100.0, 1.0),
        ),
        ("american", PayoffSpec::american(OptionType::Put, 100.0, 1.0)),
    ];

    for n_paths in [1_000, 10_000] {
        let e = engine(n_paths, 50, GreekMode::Autodiff);
        for (name, payoff) in &payoffs {
            group.bench_with_input(BenchmarkId::new(*name, n_paths), &n_paths, |b, _| {
                b.iter(|| black_box(e.price(&params, payoff).unwrap()));
            });
        }
    }

    group.finish();
}

/// Benchmark first- and second-order Greeks in both modes.
fn bench_greeks(c: &mut Criterion) {
    let mut group = c.benchmark_group("greeks");
    group.sample_size(10);

    let params = ModelParameters::gbm(100.0, 0.2, 0.05);
    let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
    let first = [Greek::Delta, Greek::Vega, Greek::Rho];
    let second = [Greek::Gamma, Greek::Vanna, Greek::Volga];

    for mode in [GreekMode::Autodiff, GreekMode::FiniteDifference] {
        let e = engine(10_000, 50, mode);
        group.bench_function(BenchmarkId::new("first_order", mode.as_str()), |b| {
            b.iter(|| black_box(e.price_with_greeks(&params, &call, &first).unwrap()));
        });
        group.bench_function(BenchmarkId::new("second_order", mode.as_str()), |b| {
            b.iter(|| black_box(e.price_with_greeks(&params, &call, &second).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_draws, bench_pricing, bench_greeks);
criterion_main!(benches);
