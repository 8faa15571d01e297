//! Stochastic process models and the parameter registry.
//!
//! - `stochastic`: the `StochasticModel` capability trait
//! - `gbm`, `heston`, `local_vol`: concrete processes
//! - `model_enum`: `ProcessModel`, the closed dispatch enum
//! - `params`: `ModelParameters`, the named registry lifted into a `ProcessModel<T>`
//! - `correlation`: correlation matrices and Cholesky factors

pub mod correlation;
pub mod gbm;
pub mod heston;
pub mod local_vol;
pub mod model_enum;
pub mod params;
pub mod stochastic;

pub use correlation::{CholeskyFactor, CorrelationError, CorrelationMatrix};
pub use model_enum::ProcessModel;
pub use params::{ModelParameters, Parameter, ParameterName, ProcessType};
pub use stochastic::StochasticModel;
