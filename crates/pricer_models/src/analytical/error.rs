//! Closed-form reference errors.

use pricer_core::types::PricingError;
use thiserror::Error;

/// Input rejected by a closed-form formula.
///
/// ```
/// use pricer_models::analytical::{AnalyticalError, BlackScholes};
///
/// let err = BlackScholes::new(100.0, 0.0, -0.2).unwrap_err();
/// assert_eq!(err, AnalyticalError::InvalidVolatility { volatility: -0.2 });
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Volatility not strictly positive.
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// Rejected volatility
        volatility: f64,
    },

    /// Spot not strictly positive.
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// Rejected spot
        spot: f64,
    },

    /// Rate is NaN or infinite.
    #[error("Invalid rate: r = {rate}")]
    InvalidRate {
        /// Rejected rate
        rate: f64,
    },
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        PricingError::InvalidModelParameters(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::BlackScholes;

    #[test]
    fn test_constructor_rejections() {
        assert_eq!(
            BlackScholes::new(0.0, 0.01, 0.2).unwrap_err(),
            AnalyticalError::InvalidSpot { spot: 0.0 }
        );
        assert!(matches!(
            BlackScholes::new(100.0, f64::NAN, 0.2),
            Err(AnalyticalError::InvalidRate { .. })
        ));
        assert!(BlackScholes::new(100.0, -0.01, 0.2).is_ok());
    }

    #[test]
    fn test_converts_to_invalid_model_parameters() {
        let err: PricingError = AnalyticalError::InvalidVolatility { volatility: 0.0 }.into();
        assert!(matches!(
            err,
            PricingError::InvalidModelParameters(ref msg) if msg.contains("σ = 0")
        ));
    }
}
