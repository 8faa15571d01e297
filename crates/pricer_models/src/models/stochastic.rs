//! StochasticModel trait for unified stochastic process interface.
//!
//! This module defines the core trait abstraction for stochastic process models
//! (GBM, Heston, local volatility), enabling a consistent interface for path
//! generation in the Monte Carlo simulator.
//!
//! ## Design Philosophy
//!
//! - **Static dispatch only**: Use enum-based dispatch (`ProcessModel`), not `Box<dyn Trait>`
//! - **Generic Float type**: Supports f64, `Dual64` and `HyperDual64` for AD
//! - **Constant draws**: Brownian increments are plain `f64` and never carry derivatives
//!
//! ## State layout
//!
//! A model's per-sample state is a flat slice: the first `n_assets()` entries
//! are asset prices, followed by any auxiliary factors (e.g. Heston variance).
//! Only the price entries are recorded into a path batch.

use pricer_core::traits::Float;

/// Unified trait interface for stochastic process models.
///
/// This trait defines the core methods required for Monte Carlo simulation:
/// - `initial_state`: Starting state at t = 0 (prices equal spot exactly)
/// - `evolve_step`: Advance the state by one time step
/// - `brownian_dim`: Number of standard normal draws consumed per step
///
/// # Type Parameters
/// * `T` - Float type (f64 or a dual number type)
///
/// # Static Dispatch Only
/// Do NOT use `Box<dyn StochasticModel>`. Use `ProcessModel` for dispatch.
pub trait StochasticModel<T: Float> {
    /// Evolve a state by one time step, in place.
    ///
    /// # Arguments
    /// * `state` - Current state (length `state_dim()`), overwritten with the next state
    /// * `dt` - Time step size (positive)
    /// * `dw` - Independent standard normal draws (length `brownian_dim()`)
    fn evolve_step(&self, state: &mut [T], dt: T, dw: &[f64]);

    /// Initial state at t = 0.
    fn initial_state(&self) -> Vec<T>;

    /// Number of traded assets (price entries at the front of the state).
    fn n_assets(&self) -> usize;

    /// Length of the per-sample state vector.
    fn state_dim(&self) -> usize;

    /// Number of standard normal draws required per step.
    fn brownian_dim(&self) -> usize;

    /// Risk-free rate used for drift and discounting.
    fn rate(&self) -> T;

    /// Model name for logging and debugging.
    fn model_name(&self) -> &'static str;
}
