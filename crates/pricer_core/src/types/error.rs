//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors raised by simulation, pricing and sensitivity extraction
//! - `TimeGridError`: Errors from time grid construction
//!
//! Lower-layer errors convert into [`PricingError`] via `From` so that callers
//! of the pricing entry points only need to match on one taxonomy.

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every failure of a pricing, simulation or sensitivity call surfaces as one
/// of these variants. No partial result accompanies an error.
///
/// # Variants
/// - `InvalidModelParameters`: Malformed inputs detected before simulation
/// - `NumericalInstability`: NaN/Inf appeared in inputs or mid-computation
/// - `ParameterNotDifferentiable`: Sensitivity requested for a fixed parameter
/// - `InvalidConfig`: Simulation or training configuration out of range
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidModelParameters("volatility must be non-negative".to_string());
/// assert_eq!(
///     format!("{}", err),
///     "Invalid model parameters: volatility must be non-negative"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Malformed correlation matrix, negative volatility, bad grid and similar.
    #[error("Invalid model parameters: {0}")]
    InvalidModelParameters(String),

    /// Non-finite value in the inputs or produced during the computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Sensitivity requested for a parameter tagged as fixed or not used by the process.
    #[error("Parameter not differentiable: {0}")]
    ParameterNotDifferentiable(String),

    /// Configuration value out of its admissible range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PricingError {
    /// Returns true when the error was raised before any simulation work.
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::PricingError;
    ///
    /// assert!(PricingError::InvalidConfig("n_paths".into()).is_input_error());
    /// assert!(!PricingError::NumericalInstability("nan".into()).is_input_error());
    /// ```
    pub fn is_input_error(&self) -> bool {
        !matches!(self, PricingError::NumericalInstability(_))
    }
}

/// Time grid construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeGridError {
    /// Fewer than two points were supplied.
    #[error("Time grid needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    /// The first point is not exactly zero.
    #[error("Time grid must start at 0, got {0}")]
    NonZeroStart(f64),

    /// Points are not strictly increasing (or contain non-finite values).
    #[error("Time grid must be strictly increasing at index {index}")]
    NotIncreasing {
        /// Index of the offending point
        index: usize,
    },

    /// Maturity is not a positive finite number.
    #[error("Invalid maturity: {0}")]
    InvalidMaturity(f64),

    /// A schedule date lies on or before the valuation date.
    #[error("Schedule date {0} is not after the valuation date")]
    DateNotAfterValuation(chrono::NaiveDate),
}

impl From<TimeGridError> for PricingError {
    fn from(err: TimeGridError) -> Self {
        PricingError::InvalidModelParameters(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::NumericalInstability("price is NaN".to_string());
        assert_eq!(format!("{}", err), "Numerical instability: price is NaN");

        let err = PricingError::ParameterNotDifferentiable("rate".to_string());
        assert_eq!(format!("{}", err), "Parameter not differentiable: rate");

        let err = PricingError::InvalidConfig("n_paths must be positive".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid configuration: n_paths must be positive"
        );
    }

    #[test]
    fn test_pricing_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&PricingError::InvalidConfig("x".into()));
    }

    #[test]
    fn test_pricing_error_clone_eq() {
        let err = PricingError::InvalidModelParameters("corr".to_string());
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_time_grid_error_converts() {
        let err: PricingError = TimeGridError::TooFewPoints(1).into();
        match err {
            PricingError::InvalidModelParameters(msg) => assert!(msg.contains("at least 2")),
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_is_input_error() {
        assert!(PricingError::InvalidModelParameters("x".into()).is_input_error());
        assert!(PricingError::ParameterNotDifferentiable("x".into()).is_input_error());
        assert!(!PricingError::NumericalInstability("x".into()).is_input_error());
    }
}
