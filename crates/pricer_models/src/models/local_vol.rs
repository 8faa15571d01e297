//! Parametric local volatility model.
//!
//! ```text
//! dS = r S dt + sigma_loc(S) S dW
//! sigma_loc(S) = sigma * exp(skew * x + smile * x^2),   x = ln(S / S0)
//! ```
//!
//! The exponential keeps the local volatility non-negative for any real
//! skew and smile, and `sigma_loc(S0) = sigma` so vega is comparable with
//! the GBM case. Steps use log-Euler with the volatility frozen at the
//! start of each step.

use pricer_core::traits::Float;

use super::stochastic::StochasticModel;

/// Local volatility parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalVolParams<T: Float> {
    /// Initial spot price (also the moneyness anchor S0)
    pub spot: T,
    /// At-the-money volatility level
    pub volatility: T,
    /// Risk-free rate
    pub rate: T,
    /// Linear coefficient in log-moneyness
    pub skew: T,
    /// Quadratic coefficient in log-moneyness
    pub smile: T,
}

/// Local volatility model with surface `sigma * exp(skew * x + smile * x^2)`.
#[derive(Clone, Debug)]
pub struct LocalVolModel<T: Float> {
    params: LocalVolParams<T>,
}

impl<T: Float> LocalVolModel<T> {
    /// Create a local volatility model.
    pub fn new(params: LocalVolParams<T>) -> Self {
        Self { params }
    }

    /// Model parameters.
    pub fn params(&self) -> &LocalVolParams<T> {
        &self.params
    }

    /// Local volatility at price `s`.
    #[inline]
    pub fn local_volatility(&self, s: T) -> T {
        let p = &self.params;
        let x = (s / p.spot).ln();
        p.volatility * (p.skew * x + p.smile * x * x).exp()
    }
}

impl<T: Float> StochasticModel<T> for LocalVolModel<T> {
    fn evolve_step(&self, state: &mut [T], dt: T, dw: &[f64]) {
        let half = T::from(0.5).unwrap();
        let s = state[0];
        let sigma = self.local_volatility(s);
        let z = T::from(dw[0]).unwrap();
        state[0] = s * ((self.params.rate - half * sigma * sigma) * dt + sigma * dt.sqrt() * z).exp();
    }

    fn initial_state(&self) -> Vec<T> {
        vec![self.params.spot]
    }

    fn n_assets(&self) -> usize {
        1
    }

    fn state_dim(&self) -> usize {
        1
    }

    fn brownian_dim(&self) -> usize {
        1
    }

    fn rate(&self) -> T {
        self.params.rate
    }

    fn model_name(&self) -> &'static str {
        "LocalVol"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(skew: f64, smile: f64) -> LocalVolParams<f64> {
        LocalVolParams {
            spot: 100.0,
            volatility: 0.2,
            rate: 0.01,
            skew,
            smile,
        }
    }

    #[test]
    fn test_atm_local_vol_equals_level() {
        let model = LocalVolModel::new(params(-0.5, 0.3));
        assert_relative_eq!(model.local_volatility(100.0), 0.2, epsilon = 1e-15);
    }

    #[test]
    fn test_negative_skew_raises_downside_vol() {
        let model = LocalVolModel::new(params(-0.5, 0.0));
        assert!(model.local_volatility(80.0) > 0.2);
        assert!(model.local_volatility(120.0) < 0.2);
    }

    #[test]
    fn test_flat_surface_matches_gbm_step() {
        let model = LocalVolModel::new(params(0.0, 0.0));
        let mut state = model.initial_state();
        model.evolve_step(&mut state, 0.5, &[0.7]);
        let expected = 100.0 * ((0.01 - 0.02) * 0.5 + 0.2 * 0.5_f64.sqrt() * 0.7).exp();
        assert_relative_eq!(state[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_local_vol_non_negative() {
        let model = LocalVolModel::new(params(3.0, -2.0));
        for s in [1.0, 50.0, 100.0, 400.0] {
            assert!(model.local_volatility(s) >= 0.0);
        }
    }
}
