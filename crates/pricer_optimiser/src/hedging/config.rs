//! Training configuration for the hedging optimiser.

use crate::error::{OptimiserError, OptimiserResult};
use crate::hedging::RiskMeasure;
use crate::solvers::OptimizerType;
use pricer_pricing::mc::{MAX_PATHS, MAX_STEPS};

/// Hedging-policy training configuration.
///
/// Use [`TrainingConfig::builder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_optimiser::hedging::{RiskMeasure, TrainingConfig};
/// use pricer_optimiser::solvers::OptimizerType;
///
/// let config = TrainingConfig::builder()
///     .n_paths(2_000)
///     .n_steps(20)
///     .optimizer_type(OptimizerType::Adam)
///     .learning_rate(0.05)
///     .risk_measure(RiskMeasure::ExpectedShortfall { level: 0.9 })
///     .seed(7)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.n_paths(), 2_000);
/// assert_eq!(config.max_grad_norm(), Some(10.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
    n_paths: usize,
    n_steps: usize,
    seed: Option<u64>,
    antithetic: bool,
    optimizer_type: OptimizerType,
    learning_rate: f64,
    max_iterations: usize,
    convergence_tolerance: f64,
    convergence_window: usize,
    max_grad_norm: Option<f64>,
    transaction_cost_rate: f64,
    risk_measure: RiskMeasure,
}

impl TrainingConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Paths per training iteration.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Rebalancing steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Seed of the trainer's random stream; `None` draws one from the OS.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether training batches use antithetic pairs.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Gradient optimiser.
    #[inline]
    pub fn optimizer_type(&self) -> OptimizerType {
        self.optimizer_type
    }

    /// Optimiser step size.
    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Iteration cap.
    #[inline]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Threshold on the change of the windowed mean loss.
    #[inline]
    pub fn convergence_tolerance(&self) -> f64 {
        self.convergence_tolerance
    }

    /// Window length for the convergence test.
    #[inline]
    pub fn convergence_window(&self) -> usize {
        self.convergence_window
    }

    /// Global-norm clipping threshold; `None` disables clipping.
    #[inline]
    pub fn max_grad_norm(&self) -> Option<f64> {
        self.max_grad_norm
    }

    /// Proportional cost per unit of traded notional.
    #[inline]
    pub fn transaction_cost_rate(&self) -> f64 {
        self.transaction_cost_rate
    }

    /// Objective applied to the terminal P&L.
    #[inline]
    pub fn risk_measure(&self) -> RiskMeasure {
        self.risk_measure
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if:
    /// - `n_paths` is 0 or above `MAX_PATHS`, `n_steps` is 0 or above `MAX_STEPS`
    /// - `learning_rate` or `max_grad_norm` is not positive and finite
    /// - `max_iterations` or `convergence_window` is 0
    /// - `convergence_tolerance` or `transaction_cost_rate` is negative
    /// - the risk measure parameter is out of range
    pub fn validate(&self) -> OptimiserResult<()> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(invalid(
                "n_paths",
                format!("must lie in [1, {}], got {}", MAX_PATHS, self.n_paths),
            ));
        }
        if self.n_steps == 0 || self.n_steps > MAX_STEPS {
            return Err(invalid(
                "n_steps",
                format!("must lie in [1, {}], got {}", MAX_STEPS, self.n_steps),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(invalid(
                "learning_rate",
                format!("must be positive, got {}", self.learning_rate),
            ));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be positive".to_string()));
        }
        if self.convergence_window == 0 {
            return Err(invalid("convergence_window", "must be positive".to_string()));
        }
        if !(self.convergence_tolerance >= 0.0 && self.convergence_tolerance.is_finite()) {
            return Err(invalid(
                "convergence_tolerance",
                format!("must be non-negative, got {}", self.convergence_tolerance),
            ));
        }
        if let Some(max) = self.max_grad_norm {
            if !(max > 0.0 && max.is_finite()) {
                return Err(invalid("max_grad_norm", format!("must be positive, got {}", max)));
            }
        }
        if !(self.transaction_cost_rate >= 0.0 && self.transaction_cost_rate.is_finite()) {
            return Err(invalid(
                "transaction_cost_rate",
                format!("must be non-negative, got {}", self.transaction_cost_rate),
            ));
        }
        self.risk_measure.validate()
    }
}

fn invalid(name: &str, reason: String) -> OptimiserError {
    OptimiserError::InvalidConfig(format!("{}: {}", name, reason))
}

/// Builder for [`TrainingConfig`].
///
/// `n_paths` and `n_steps` are required. Defaults: Adam at 0.01, 200
/// iterations, tolerance 1e-6 over windows of 20, clipping at 10, no
/// transaction costs, variance objective.
#[derive(Clone, Debug)]
pub struct TrainingConfigBuilder {
    n_paths: Option<usize>,
    n_steps: Option<usize>,
    seed: Option<u64>,
    antithetic: bool,
    optimizer_type: OptimizerType,
    learning_rate: f64,
    max_iterations: usize,
    convergence_tolerance: f64,
    convergence_window: usize,
    max_grad_norm: Option<f64>,
    transaction_cost_rate: f64,
    risk_measure: RiskMeasure,
}

impl Default for TrainingConfigBuilder {
    fn default() -> Self {
        Self {
            n_paths: None,
            n_steps: None,
            seed: None,
            antithetic: false,
            optimizer_type: OptimizerType::Adam,
            learning_rate: 0.01,
            max_iterations: 200,
            convergence_tolerance: 1e-6,
            convergence_window: 20,
            max_grad_norm: Some(10.0),
            transaction_cost_rate: 0.0,
            risk_measure: RiskMeasure::Variance,
        }
    }
}

impl TrainingConfigBuilder {
    /// Sets the paths per iteration.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the rebalancing steps per path.
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the seed of the trainer's random stream.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables antithetic training batches.
    #[inline]
    pub fn antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Sets the gradient optimiser.
    #[inline]
    pub fn optimizer_type(mut self, optimizer_type: OptimizerType) -> Self {
        self.optimizer_type = optimizer_type;
        self
    }

    /// Sets the step size.
    #[inline]
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the iteration cap.
    #[inline]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[inline]
    pub fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    /// Sets the convergence window length.
    #[inline]
    pub fn convergence_window(mut self, window: usize) -> Self {
        self.convergence_window = window;
        self
    }

    /// Sets (or with `None` disables) gradient clipping.
    #[inline]
    pub fn max_grad_norm(mut self, max_grad_norm: Option<f64>) -> Self {
        self.max_grad_norm = max_grad_norm;
        self
    }

    /// Sets the proportional transaction cost rate.
    #[inline]
    pub fn transaction_cost_rate(mut self, rate: f64) -> Self {
        self.transaction_cost_rate = rate;
        self
    }

    /// Sets the objective.
    #[inline]
    pub fn risk_measure(mut self, risk_measure: RiskMeasure) -> Self {
        self.risk_measure = risk_measure;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a required field is unset or a value is out of
    /// range (see [`TrainingConfig::validate`]).
    pub fn build(self) -> OptimiserResult<TrainingConfig> {
        let n_paths = self
            .n_paths
            .ok_or_else(|| invalid("n_paths", "must be specified".to_string()))?;
        let n_steps = self
            .n_steps
            .ok_or_else(|| invalid("n_steps", "must be specified".to_string()))?;
        let config = TrainingConfig {
            n_paths,
            n_steps,
            seed: self.seed,
            antithetic: self.antithetic,
            optimizer_type: self.optimizer_type,
            learning_rate: self.learning_rate,
            max_iterations: self.max_iterations,
            convergence_tolerance: self.convergence_tolerance,
            convergence_window: self.convergence_window,
            max_grad_norm: self.max_grad_norm,
            transaction_cost_rate: self.transaction_cost_rate,
            risk_measure: self.risk_measure,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TrainingConfigBuilder {
        TrainingConfig::builder().n_paths(100).n_steps(10)
    }

    #[test]
    fn test_builder_defaults() {
        let config = base().build().unwrap();
        assert_eq!(config.optimizer_type(), OptimizerType::Adam);
        assert_eq!(config.learning_rate(), 0.01);
        assert_eq!(config.max_iterations(), 200);
        assert_eq!(config.convergence_window(), 20);
        assert_eq!(config.max_grad_norm(), Some(10.0));
        assert_eq!(config.transaction_cost_rate(), 0.0);
        assert_eq!(config.risk_measure(), RiskMeasure::Variance);
        assert_eq!(config.seed(), None);
        assert!(!config.antithetic());
    }

    #[test]
    fn test_required_fields() {
        assert!(TrainingConfig::builder().n_steps(10).build().is_err());
        assert!(TrainingConfig::builder().n_paths(10).build().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            base().n_paths(0),
            base().n_steps(0),
            base().learning_rate(0.0),
            base().learning_rate(f64::NAN),
            base().max_iterations(0),
            base().convergence_window(0),
            base().convergence_tolerance(-1.0),
            base().max_grad_norm(Some(0.0)),
            base().transaction_cost_rate(-0.01),
            base().risk_measure(RiskMeasure::ExpectedShortfall { level: 1.0 }),
        ];
        for builder in cases {
            assert!(matches!(builder.build(), Err(OptimiserError::InvalidConfig(_))));
        }
        assert!(base().max_grad_norm(None).build().is_ok());
    }
}
