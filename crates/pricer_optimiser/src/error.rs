//! Error types for policy training.

use crate::hedging::TrainingDiagnostics;
use pricer_core::types::PricingError;
use thiserror::Error;

/// Errors raised while configuring or running the hedging optimiser.
///
/// # Examples
///
/// ```
/// use pricer_core::types::PricingError;
/// use pricer_optimiser::OptimiserError;
///
/// let err: OptimiserError = PricingError::InvalidConfig("n_paths".into()).into();
/// assert!(format!("{}", err).contains("n_paths"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// The objective or its gradient became non-finite.
    ///
    /// The policy is not returned; the diagnostics stop at the last
    /// iteration whose loss and gradient were finite.
    #[error("Training diverged at iteration {iteration}")]
    TrainingDiverged {
        /// Iteration (0-based) that produced the non-finite value
        iteration: usize,
        /// Loss and gradient history up to the last valid iteration
        diagnostics: TrainingDiagnostics,
    },

    /// Training configuration out of its admissible range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Simulation or payoff failure.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Result alias for optimiser operations.
pub type OptimiserResult<T> = Result<T, OptimiserError>;
