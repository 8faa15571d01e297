//! Heston stochastic volatility model.
//!
//! ```text
//! dS = r * S * dt + sqrt(V) * S * dW_S
//! dV = kappa * (theta - V) * dt + xi * sqrt(V) * dW_V
//! E[dW_S * dW_V] = rho * dt
//! ```
//!
//! ## Parameterisation
//!
//! The initial variance is `v0 = sigma^2` where `sigma` is the registry's
//! `volatility` entry, so vega is reported against an instantaneous
//! volatility and `v0` stays non-negative for any real `sigma`.
//!
//! ## Discretisation
//!
//! Log-Euler for the price and full-truncation Euler for the variance:
//! ```text
//! v+      = max(v, VARIANCE_FLOOR)
//! S(t+dt) = S * exp((r - v+/2) dt + sqrt(v+ dt) Z1)
//! v(t+dt) = v + kappa (theta - v+) dt + xi sqrt(v+ dt) (rho Z1 + sqrt(1 - rho^2) Z2)
//! ```
//! The stored variance may go negative; only its truncated value enters
//! drift and diffusion. The floor keeps `sqrt` differentiable at zero.

use pricer_core::traits::Float;

use super::stochastic::StochasticModel;

/// Lower bound applied to the variance before it enters drift or diffusion.
pub const VARIANCE_FLOOR: f64 = 1e-12;

/// Heston model parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HestonParams<T: Float> {
    /// Initial spot price
    pub spot: T,
    /// Initial instantaneous volatility (v0 = volatility²)
    pub volatility: T,
    /// Risk-free rate
    pub rate: T,
    /// Mean reversion speed (kappa)
    pub mean_reversion: T,
    /// Long-run variance (theta)
    pub long_run_variance: T,
    /// Volatility of variance (xi)
    pub vol_of_vol: T,
    /// Spot/variance correlation (rho)
    pub correlation: T,
}

impl<T: Float> HestonParams<T> {
    /// Initial variance `volatility²`.
    #[inline]
    pub fn initial_variance(&self) -> T {
        self.volatility * self.volatility
    }

    /// Feller condition `2 kappa theta > xi²`.
    ///
    /// When it fails the variance process can reach zero and the floor
    /// becomes active more often.
    pub fn satisfies_feller(&self) -> bool {
        let two = T::from(2.0).unwrap();
        two * self.mean_reversion * self.long_run_variance > self.vol_of_vol * self.vol_of_vol
    }
}

/// Heston stochastic volatility model (single asset, state `[S, v]`).
#[derive(Clone, Debug)]
pub struct HestonModel<T: Float> {
    params: HestonParams<T>,
}

impl<T: Float> HestonModel<T> {
    /// Create a Heston model from already validated parameters.
    pub fn new(params: HestonParams<T>) -> Self {
        Self { params }
    }

    /// Model parameters.
    pub fn params(&self) -> &HestonParams<T> {
        &self.params
    }
}

impl<T: Float> StochasticModel<T> for HestonModel<T> {
    fn evolve_step(&self, state: &mut [T], dt: T, dw: &[f64]) {
        let p = &self.params;
        let half = T::from(0.5).unwrap();
        let floor = T::from(VARIANCE_FLOOR).unwrap();

        let s = state[0];
        let v = state[1];
        let v_pos = if v > floor { v } else { floor };
        let vol_sqrt_dt = (v_pos * dt).sqrt();

        let z1 = T::from(dw[0]).unwrap();
        let z2 = T::from(dw[1]).unwrap();
        let rho = p.correlation;
        // At |rho| = 1 the sqrt has an infinite tangent, so skip the
        // independent shock instead of evaluating sqrt(0).
        let complement = T::one() - rho * rho;
        let w_v = if complement > T::zero() {
            rho * z1 + complement.sqrt() * z2
        } else {
            rho * z1
        };

        state[0] = s * ((p.rate - half * v_pos) * dt + vol_sqrt_dt * z1).exp();
        state[1] = v
            + p.mean_reversion * (p.long_run_variance - v_pos) * dt
            + p.vol_of_vol * vol_sqrt_dt * w_v;
    }

    fn initial_state(&self) -> Vec<T> {
        vec![self.params.spot, self.params.initial_variance()]
    }

    fn n_assets(&self) -> usize {
        1
    }

    fn state_dim(&self) -> usize {
        2
    }

    fn brownian_dim(&self) -> usize {
        2
    }

    fn rate(&self) -> T {
        self.params.rate
    }

    fn model_name(&self) -> &'static str {
        "Heston"
    }
}
