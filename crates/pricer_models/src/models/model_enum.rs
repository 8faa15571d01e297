//! Static dispatch enum for stochastic models.
//!
//! `ProcessModel` is the closed set of processes the simulator understands.
//! Using an enum instead of trait objects keeps every scalar instantiation
//! (f64, dual, hyper-dual) monomorphised with no vtable indirection.
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::model_enum::ProcessModel;
//! use pricer_models::models::params::ModelParameters;
//! use pricer_models::models::stochastic::StochasticModel;
//!
//! let params = ModelParameters::gbm(100.0, 0.2, 0.05);
//! let model: ProcessModel<f64> = params.lift_f64().unwrap();
//!
//! assert_eq!(model.model_name(), "GBM");
//! assert_eq!(model.brownian_dim(), 1);
//! assert_eq!(model.initial_state(), vec![100.0]);
//! ```

use pricer_core::traits::Float;

use super::gbm::GbmModel;
use super::heston::HestonModel;
use super::local_vol::LocalVolModel;
use super::stochastic::StochasticModel;

/// Static dispatch enum for stochastic models.
///
/// # Supported Models
///
/// - `Gbm`: Geometric Brownian Motion (1..n correlated assets)
/// - `Heston`: Stochastic volatility model (single asset, 2 factors)
/// - `LocalVol`: Parametric local volatility (single asset)
#[derive(Clone, Debug)]
pub enum ProcessModel<T: Float> {
    /// Geometric Brownian Motion
    Gbm(GbmModel<T>),
    /// Heston stochastic volatility
    Heston(HestonModel<T>),
    /// Parametric local volatility
    LocalVol(LocalVolModel<T>),
}

impl<T: Float> StochasticModel<T> for ProcessModel<T> {
    #[inline]
    fn evolve_step(&self, state: &mut [T], dt: T, dw: &[f64]) {
        match self {
            ProcessModel::Gbm(m) => m.evolve_step(state, dt, dw),
            ProcessModel::Heston(m) => m.evolve_step(state, dt, dw),
            ProcessModel::LocalVol(m) => m.evolve_step(state, dt, dw),
        }
    }

    fn initial_state(&self) -> Vec<T> {
        match self {
            ProcessModel::Gbm(m) => m.initial_state(),
            ProcessModel::Heston(m) => m.initial_state(),
            ProcessModel::LocalVol(m) => m.initial_state(),
        }
    }

    fn n_assets(&self) -> usize {
        match self {
            ProcessModel::Gbm(m) => m.n_assets(),
            ProcessModel::Heston(m) => m.n_assets(),
            ProcessModel::LocalVol(m) => m.n_assets(),
        }
    }

    fn state_dim(&self) -> usize {
        match self {
            ProcessModel::Gbm(m) => m.state_dim(),
            ProcessModel::Heston(m) => m.state_dim(),
            ProcessModel::LocalVol(m) => m.state_dim(),
        }
    }

    fn brownian_dim(&self) -> usize {
        match self {
            ProcessModel::Gbm(m) => m.brownian_dim(),
            ProcessModel::Heston(m) => m.brownian_dim(),
            ProcessModel::LocalVol(m) => m.brownian_dim(),
        }
    }

    fn rate(&self) -> T {
        match self {
            ProcessModel::Gbm(m) => m.rate(),
            ProcessModel::Heston(m) => m.rate(),
            ProcessModel::LocalVol(m) => m.rate(),
        }
    }

    fn model_name(&self) -> &'static str {
        match self {
            ProcessModel::Gbm(m) => m.model_name(),
            ProcessModel::Heston(m) => m.model_name(),
            ProcessModel::LocalVol(m) => m.model_name(),
        }
    }
}

impl<T: Float> ProcessModel<T> {
    /// Initial prices of the traded assets.
    pub fn spots(&self) -> Vec<T> {
        let n = self.n_assets();
        let mut state = self.initial_state();
        state.truncate(n);
        state
    }
}
