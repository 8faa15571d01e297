//! Geometric Brownian Motion (GBM) model implementation.
//!
//! GBM is the fundamental model for asset price dynamics, described by:
//! ```text
//! dS_i = r * S_i * dt + sigma_i * S_i * dW_i,   d<W_i, W_j> = C_ij dt
//! ```
//!
//! ## Log-space formulation
//!
//! Each step uses the exact solution of the SDE:
//! ```text
//! S(t+dt) = S(t) * exp((r - 0.5*sigma^2)*dt + sigma*sqrt(dt)*W)
//! ```
//! so the scheme carries no discretisation bias at the grid points. With
//! several assets, `W = L * Z` where `L` is the Cholesky factor of the
//! (fixed) correlation matrix.

use pricer_core::traits::Float;
use std::borrow::Cow;

use super::correlation::CholeskyFactor;
use super::stochastic::StochasticModel;

/// GBM model parameters, one spot and volatility per asset.
#[derive(Clone, Debug, PartialEq)]
pub struct GbmParams<T: Float> {
    /// Initial spot prices
    pub spots: Vec<T>,
    /// Volatilities (annualised)
    pub volatilities: Vec<T>,
    /// Risk-free rate (annualised)
    pub rate: T,
}

/// Geometric Brownian Motion model.
#[derive(Clone, Debug)]
pub struct GbmModel<T: Float> {
    params: GbmParams<T>,
    cholesky: Option<CholeskyFactor>,
}

impl<T: Float> GbmModel<T> {
    /// Create a GBM model.
    ///
    /// `cholesky` must have dimension `params.spots.len()` when present;
    /// `None` means independent assets.
    pub fn new(params: GbmParams<T>, cholesky: Option<CholeskyFactor>) -> Self {
        debug_assert_eq!(params.spots.len(), params.volatilities.len());
        Self { params, cholesky }
    }

    /// Model parameters.
    pub fn params(&self) -> &GbmParams<T> {
        &self.params
    }
}

impl<T: Float> StochasticModel<T> for GbmModel<T> {
    fn evolve_step(&self, state: &mut [T], dt: T, dw: &[f64]) {
        let n = self.params.spots.len();
        let half = T::from(0.5).unwrap();
        let sqrt_dt = dt.sqrt();
        let r = self.params.rate;

        let w: Cow<'_, [f64]> = match &self.cholesky {
            Some(l) if n > 1 => Cow::Owned(l.transform(dw)),
            _ => Cow::Borrowed(dw),
        };

        for (i, s) in state.iter_mut().take(n).enumerate() {
            let sigma = self.params.volatilities[i];
            let drift = (r - half * sigma * sigma) * dt;
            let diffusion = sigma * sqrt_dt * T::from(w[i]).unwrap();
            *s = *s * (drift + diffusion).exp();
        }
    }

    fn initial_state(&self) -> Vec<T> {
        self.params.spots.clone()
    }

    fn n_assets(&self) -> usize {
        self.params.spots.len()
    }

    fn state_dim(&self) -> usize {
        self.params.spots.len()
    }

    fn brownian_dim(&self) -> usize {
        self.params.spots.len()
    }

    fn rate(&self) -> T {
        self.params.rate
    }

    fn model_name(&self) -> &'static str {
        "GBM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::correlation::CorrelationMatrix;
    use approx::assert_relative_eq;
    use num_dual::Dual64;

    fn single(spot: f64, vol: f64, rate: f64) -> GbmModel<f64> {
        GbmModel::new(
            GbmParams {
                spots: vec![spot],
                volatilities: vec![vol],
                rate,
            },
            None,
        )
    }

    #[test]
    fn test_initial_state_is_spot() {
        let model = single(100.0, 0.2, 0.05);
        assert_eq!(model.initial_state(), vec![100.0]);
        assert_eq!(model.model_name(), "GBM");
        assert_eq!(model.brownian_dim(), 1);
    }

    #[test]
    fn test_evolve_step_exact_solution() {
        let model = single(100.0, 0.2, 0.05);
        let mut state = model.initial_state();
        model.evolve_step(&mut state, 0.25, &[0.3]);
        let expected = 100.0 * ((0.05 - 0.02) * 0.25 + 0.2 * 0.5 * 0.3_f64).exp();
        assert_relative_eq!(state[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_volatility_is_deterministic_forward() {
        let model = single(100.0, 0.0, 0.05);
        let mut state = model.initial_state();
        for z in [1.5, -2.0, 0.3, 4.0] {
            model.evolve_step(&mut state, 0.25, &[z]);
        }
        assert_relative_eq!(state[0], 100.0 * 0.05_f64.exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_correlated_two_assets() {
        let corr = CorrelationMatrix::new(&[1.0, 1.0, 1.0, 1.0], 2).unwrap();
        let model = GbmModel::new(
            GbmParams {
                spots: vec![100.0, 50.0],
                volatilities: vec![0.2, 0.2],
                rate: 0.0,
            },
            Some(corr.cholesky().unwrap()),
        );
        let mut state = model.initial_state();
        model.evolve_step(&mut state, 1.0, &[0.5, -1.0]);
        // Perfect correlation: both assets see the same shock.
        assert_relative_eq!(state[0] / 100.0, state[1] / 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dual_spot_derivative() {
        // dS_T/dS_0 = S_T / S_0 under GBM
        let model = GbmModel::new(
            GbmParams {
                spots: vec![Dual64::new(100.0, 1.0)],
                volatilities: vec![Dual64::new(0.2, 0.0)],
                rate: Dual64::new(0.05, 0.0),
            },
            None,
        );
        let mut state = model.initial_state();
        model.evolve_step(&mut state, Dual64::new(1.0, 0.0), &[0.4]);
        assert_relative_eq!(state[0].eps, state[0].re / 100.0, epsilon = 1e-12);
    }
}
