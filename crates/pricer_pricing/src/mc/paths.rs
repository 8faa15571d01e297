//! Path simulation for Monte Carlo pricing.
//!
//! [`simulate`] advances a [`ProcessModel<T>`] across a time grid using a
//! pre-generated [`DrawSet`], writing asset prices into a [`PathBatch<T>`].
//!
//! # Activity
//!
//! - model parameters and maturity: scalar type `T` (carry derivatives)
//! - draws: `f64` constants (never differentiated)
//!
//! # Memory Layout
//!
//! Paths are stored row-major as (sample, time point, asset):
//! `data[(sample * n_points + point) * n_assets + asset]`, where point 0
//! holds the spot.

use pricer_core::traits::Float;
use pricer_core::types::{PricingError, TimeGrid};
use pricer_models::models::{ProcessModel, StochasticModel};
use rayon::prelude::*;

use crate::rng::DrawSet;

/// Dense simulated prices, indexed by (sample, time point, asset).
///
/// Immutable once produced by [`simulate`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathBatch<T: Float> {
    n_samples: usize,
    n_points: usize,
    n_assets: usize,
    data: Vec<T>,
}

impl<T: Float> PathBatch<T> {
    /// Number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of time points (steps + 1).
    #[inline]
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Number of assets.
    #[inline]
    pub fn n_assets(&self) -> usize {
        self.n_assets
    }

    /// Price of `asset` at `point` on `sample`.
    #[inline]
    pub fn get(&self, sample: usize, point: usize, asset: usize) -> T {
        self.data[(sample * self.n_points + point) * self.n_assets + asset]
    }

    /// All prices of one sample, (point, asset) row-major.
    #[inline]
    pub fn sample(&self, sample: usize) -> &[T] {
        let width = self.n_points * self.n_assets;
        &self.data[sample * width..(sample + 1) * width]
    }

    /// Prices of all assets at one point of one sample.
    #[inline]
    pub fn state(&self, sample: usize, point: usize) -> &[T] {
        let start = (sample * self.n_points + point) * self.n_assets;
        &self.data[start..start + self.n_assets]
    }

    /// Terminal price of `asset` on `sample`.
    #[inline]
    pub fn terminal(&self, sample: usize, asset: usize) -> T {
        self.get(sample, self.n_points - 1, asset)
    }

    /// Weighted combination `Σ wᵢ Sᵢ(t)` along one sample.
    ///
    /// `weights` must have one entry per asset.
    pub fn weighted_path(&self, sample: usize, weights: &[T]) -> Vec<T> {
        debug_assert_eq!(weights.len(), self.n_assets);
        self.sample(sample)
            .chunks_exact(self.n_assets)
            .map(|prices| {
                prices
                    .iter()
                    .zip(weights)
                    .fold(T::zero(), |acc, (&s, &w)| acc + w * s)
            })
            .collect()
    }
}

/// Simulates `draws.n_samples()` paths of `model` on `grid`, rescaled to `maturity`.
///
/// The grid supplies the relative spacing of the time points; step sizes
/// are `maturity × (fraction(i+1) − fraction(i))` in the scalar type, so
/// seeding `maturity` with a derivative direction differentiates with
/// respect to the horizon.
///
/// Samples are simulated in parallel; the result is deterministic because
/// every draw is fixed in advance.
///
/// # Errors
///
/// - `InvalidModelParameters` if the draw set does not match the grid or
///   the model's Brownian dimension, or the sample count is zero
/// - `NumericalInstability` if `maturity` is not finite and positive
pub fn simulate<T>(
    model: &ProcessModel<T>,
    grid: &TimeGrid,
    maturity: T,
    draws: &DrawSet,
) -> Result<PathBatch<T>, PricingError>
where
    T: Float + Send + Sync,
{
    if draws.n_samples() == 0 {
        return Err(PricingError::InvalidModelParameters(
            "sample count must be positive".to_string(),
        ));
    }
    if draws.n_steps() != grid.n_steps() {
        return Err(PricingError::InvalidModelParameters(format!(
            "draw set has {} steps, grid has {}",
            draws.n_steps(),
            grid.n_steps()
        )));
    }
    if draws.n_factors() != model.brownian_dim() {
        return Err(PricingError::InvalidModelParameters(format!(
            "draw set has {} factors, {} model needs {}",
            draws.n_factors(),
            model.model_name(),
            model.brownian_dim()
        )));
    }
    if !(maturity.is_finite() && maturity > T::zero()) {
        return Err(PricingError::NumericalInstability(format!(
            "maturity must be finite and positive, got {:?}",
            maturity.to_f64()
        )));
    }

    let n_samples = draws.n_samples();
    let n_points = grid.n_steps() + 1;
    let n_assets = model.n_assets();
    let steps = grid.scaled_steps(maturity);
    let initial = model.initial_state();

    let mut data = vec![T::zero(); n_samples * n_points * n_assets];
    data.par_chunks_mut(n_points * n_assets)
        .enumerate()
        .for_each(|(sample, out)| {
            let mut state = initial.clone();
            let mut dw = vec![0.0; draws.n_factors()];
            out[..n_assets].copy_from_slice(&state[..n_assets]);
            for (step, &dt) in steps.iter().enumerate() {
                draws.write(sample, step, &mut dw);
                model.evolve_step(&mut state, dt, &dw);
                let start = (step + 1) * n_assets;
                out[start..start + n_assets].copy_from_slice(&state[..n_assets]);
            }
        });

    Ok(PathBatch {
        n_samples,
        n_points,
        n_assets,
        data,
    })
}
