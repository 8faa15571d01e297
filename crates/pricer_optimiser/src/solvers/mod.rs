//! First-order gradient optimisers for policy parameters.
//!
//! # Algorithms
//!
//! - [`Sgd`]: stochastic gradient descent with heavy-ball momentum
//! - [`Adam`]: adaptive moment estimation with bias correction
//!
//! Both update a flat `f64` parameter vector in place from a gradient of
//! the same length. [`clip_gradient`] rescales a gradient to a maximum
//! global L2 norm before the step.
//!
//! # Example
//!
//! ```
//! use pricer_optimiser::solvers::{GradientOptimiser, OptimizerType};
//!
//! // Minimise (p - 3)^2
//! let mut params = vec![0.0];
//! let mut opt = OptimizerType::Adam.build(0.1, 1);
//! for _ in 0..500 {
//!     let grad = vec![2.0 * (params[0] - 3.0)];
//!     opt.step(&mut params, &grad);
//! }
//! assert!((params[0] - 3.0).abs() < 1e-2);
//! ```

mod adam;
mod clip;
mod sgd;

pub use adam::Adam;
pub use clip::{clip_gradient, global_norm};
pub use sgd::Sgd;

use std::fmt;
use std::str::FromStr;

/// In-place first-order update rule.
pub trait GradientOptimiser: Send {
    /// Applies one update to `params` given `grad`.
    ///
    /// # Panics
    /// Panics if `params` and `grad` lengths differ from the optimiser state.
    fn step(&mut self, params: &mut [f64], grad: &[f64]);

    /// Current learning rate.
    fn learning_rate(&self) -> f64;

    /// Algorithm name.
    fn name(&self) -> &'static str;
}

/// Selectable optimiser algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OptimizerType {
    /// SGD with momentum 0.9
    Sgd,
    /// Adam with (0.9, 0.999, 1e-8)
    #[default]
    Adam,
}

impl OptimizerType {
    /// Lower-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizerType::Sgd => "sgd",
            OptimizerType::Adam => "adam",
        }
    }

    /// Builds a fresh optimiser for `n_params` parameters.
    pub fn build(&self, learning_rate: f64, n_params: usize) -> Box<dyn GradientOptimiser> {
        match self {
            OptimizerType::Sgd => Box::new(Sgd::new(learning_rate, Sgd::DEFAULT_MOMENTUM, n_params)),
            OptimizerType::Adam => Box::new(Adam::new(learning_rate, n_params)),
        }
    }
}

impl fmt::Display for OptimizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgd" => Ok(OptimizerType::Sgd),
            "adam" => Ok(OptimizerType::Adam),
            other => Err(format!("unknown optimizer type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimise(kind: OptimizerType, lr: f64, iterations: usize) -> Vec<f64> {
        // f(x, y) = (x - 1)^2 + 10 (y + 2)^2
        let mut params = vec![0.0, 0.0];
        let mut opt = kind.build(lr, 2);
        for _ in 0..iterations {
            let grad = [2.0 * (params[0] - 1.0), 20.0 * (params[1] + 2.0)];
            opt.step(&mut params, &grad);
        }
        params
    }

    #[test]
    fn test_both_optimisers_reach_quadratic_minimum() {
        for (kind, lr) in [(OptimizerType::Sgd, 0.01), (OptimizerType::Adam, 0.05)] {
            let p = minimise(kind, lr, 2_000);
            assert!((p[0] - 1.0).abs() < 1e-2, "{}: {:?}", kind, p);
            assert!((p[1] + 2.0).abs() < 1e-2, "{}: {:?}", kind, p);
        }
    }

    #[test]
    fn test_optimizer_type_parsing() {
        assert_eq!("SGD".parse::<OptimizerType>().unwrap(), OptimizerType::Sgd);
        assert_eq!("adam".parse::<OptimizerType>().unwrap(), OptimizerType::Adam);
        assert!("lbfgs".parse::<OptimizerType>().is_err());
        assert_eq!(OptimizerType::default().to_string(), "adam");
    }

    #[test]
    fn test_build_reports_name_and_rate() {
        let opt = OptimizerType::Sgd.build(0.3, 4);
        assert_eq!(opt.name(), "sgd");
        assert_eq!(opt.learning_rate(), 0.3);
    }
}
