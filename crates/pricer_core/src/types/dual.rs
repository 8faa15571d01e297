//! Dual number type integration for automatic differentiation.
//!
//! This module provides type aliases for num-dual's scalar types. Both
//! implement `num_traits::Float`, so every routine generic over
//! `T: Float` (simulation, payoffs, discounting, hedging) propagates
//! derivatives without modification.
//!
//! - [`DualNumber`]: first-order forward mode, one directional derivative per pass
//! - [`HyperDualNumber`]: two seeded directions plus their mixed second derivative
//!
//! ## Usage
//!
//! ```
//! use pricer_core::math::smoothing::smooth_max;
//! use pricer_core::types::dual::DualNumber;
//!
//! let a = DualNumber::new(3.0, 1.0); // da/da = 1
//! let b = DualNumber::new(5.0, 0.0);
//! let eps = DualNumber::new(1e-6, 0.0);
//!
//! let result = smooth_max(a, b, eps);
//! assert!((result.re - 5.0).abs() < 1e-3);
//! assert!(result.eps.abs() < 1e-3); // b dominates
//! ```

/// Type alias for num-dual's Dual64 (f64-based dual numbers).
///
/// - `re`: Real part (function value)
/// - `eps`: Dual part (directional derivative)
pub type DualNumber = num_dual::Dual64;

/// Type alias for num-dual's HyperDual64.
///
/// Seeding `eps1` along direction `a` and `eps2` along direction `b`
/// yields `∂f/∂a` in `eps1`, `∂f/∂b` in `eps2` and `∂²f/∂a∂b` in `eps1eps2`.
/// Seeding both along the same direction gives a pure second derivative.
pub type HyperDualNumber = num_dual::HyperDual64;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_traits::Float;

    #[test]
    fn test_dual_number_creation() {
        let dual = DualNumber::new(3.0, 1.0);
        assert_eq!(dual.re, 3.0);
        assert_eq!(dual.eps, 1.0);
    }

    #[test]
    fn test_hyper_dual_second_derivative() {
        // f(x) = x^3, f''(2) = 12
        let x = HyperDualNumber::new(2.0, 1.0, 1.0, 0.0);
        let y = x * x * x;
        assert_relative_eq!(y.re, 8.0, epsilon = 1e-12);
        assert_relative_eq!(y.eps1, 12.0, epsilon = 1e-12);
        assert_relative_eq!(y.eps1eps2, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dual_through_float_bound() {
        fn discount<T: Float>(rate: T, time: T) -> T {
            (-rate * time).exp()
        }

        let rate = DualNumber::new(0.05, 1.0);
        let time = DualNumber::new(2.0, 0.0);
        let df = discount(rate, time);
        assert_relative_eq!(df.re, (-0.1_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(df.eps, -2.0 * (-0.1_f64).exp(), epsilon = 1e-12);
    }
}
