//! Pricing result type.

use std::collections::BTreeMap;

/// Price estimate with its standard error and any requested sensitivities.
///
/// Sensitivities are keyed by name: `delta`, `gamma`, `vega`, `theta`,
/// `rho`, `vanna`, `volga` for named Greeks (suffixed `[i]` per asset for
/// baskets), `dV/d{name}[i]` and `d2V/d{a}[i]d{b}[j]` for generic requests.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::greeks::PricingResult;
///
/// let result = PricingResult::new(10.45, 0.02, 100_000).with_sensitivity("delta", 0.64);
/// assert_eq!(result.get("delta"), Some(0.64));
/// assert!((result.confidence_95() - 0.0392).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value.
    pub price: f64,
    /// Standard error of the price estimate.
    pub std_error: f64,
    /// Number of simulated samples.
    pub n_paths: usize,
    /// Requested sensitivities by key.
    pub sensitivities: BTreeMap<String, f64>,
}

impl PricingResult {
    /// Result with no sensitivities.
    pub fn new(price: f64, std_error: f64, n_paths: usize) -> Self {
        Self {
            price,
            std_error,
            n_paths,
            sensitivities: BTreeMap::new(),
        }
    }

    /// Adds one sensitivity.
    pub fn with_sensitivity(mut self, key: impl Into<String>, value: f64) -> Self {
        self.sensitivities.insert(key.into(), value);
        self
    }

    /// Sensitivity stored under `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.sensitivities.get(key).copied()
    }

    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Returns the 99% confidence interval half-width.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_confidence_intervals() {
        let result = PricingResult::new(10.0, 0.1, 1000);
        assert_relative_eq!(result.confidence_95(), 0.196, epsilon = 1e-12);
        assert_relative_eq!(result.confidence_99(), 0.2576, epsilon = 1e-12);
    }

    #[test]
    fn test_sensitivity_lookup() {
        let result = PricingResult::new(5.0, 0.0, 1)
            .with_sensitivity("delta[0]", 0.3)
            .with_sensitivity("delta[1]", 0.2);
        assert_eq!(result.get("delta[1]"), Some(0.2));
        assert_eq!(result.get("delta"), None);
        assert_eq!(result.sensitivities.len(), 2);
    }
}
