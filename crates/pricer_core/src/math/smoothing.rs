//! Smooth approximations for discontinuous functions.
//!
//! This module provides differentiable smoothing functions that replace
//! discontinuous operations (max and the indicator) with smooth approximations.
//! Pathwise sensitivities of kinked or digital payoffs are zero or undefined
//! almost everywhere, so sensitivity passes evaluate these surrogates instead.
//!
//! The width-aware helpers ([`positive_part`], [`step`]) treat a width of
//! exactly zero as "no smoothing" and return the exact function. Widths are
//! expressed in the units of the argument (price units for payoffs).
//!
//! All functions use generic type parameter `T: num_traits::Float` and so
//! accept `f64` as well as the dual number types from `types::dual`.

use num_traits::Float;

/// Differentiable maximum function using LogSumExp.
///
/// # Mathematical Definition
/// ```text
/// smooth_max(a, b, ε) = ε * log(exp(a/ε) + exp(b/ε))
/// ```
///
/// # Convergence
/// As ε → 0, smooth_max(a, b, ε) → max(a, b). The bias is at most ε·ln 2.
///
/// # Panics
/// Panics if epsilon <= 0
///
/// # Examples
/// ```
/// use pricer_core::math::smoothing::smooth_max;
///
/// let result = smooth_max(3.0_f64, 5.0_f64, 1e-6);
/// assert!((result - 5.0).abs() < 1e-3);
/// ```
#[inline]
pub fn smooth_max<T: Float>(a: T, b: T, epsilon: T) -> T {
    assert!(epsilon > T::zero(), "epsilon must be positive");

    // m + ε * log(exp((a-m)/ε) + exp((b-m)/ε)) with m = max(a, b)
    let m = if a > b { a } else { b };
    let exp_a = ((a - m) / epsilon).exp();
    let exp_b = ((b - m) / epsilon).exp();

    m + epsilon * (exp_a + exp_b).ln()
}

/// Differentiable Heaviside function using the logistic sigmoid.
///
/// # Mathematical Definition
/// ```text
/// smooth_indicator(x, ε) = 1 / (1 + exp(-x/ε))
/// ```
///
/// # Convergence
/// As ε → 0:
/// - x < 0 → 0
/// - x = 0 → 0.5
/// - x > 0 → 1
///
/// Evaluated in the branch where the exponent is non-positive, so the
/// derivative stays finite (tends to zero) far from the threshold.
///
/// # Panics
/// Panics if epsilon <= 0
#[inline]
pub fn smooth_indicator<T: Float>(x: T, epsilon: T) -> T {
    assert!(epsilon > T::zero(), "epsilon must be positive");

    let one = T::one();
    let z = x / epsilon;
    if z >= T::zero() {
        one / (one + (-z).exp())
    } else {
        let e = z.exp();
        e / (one + e)
    }
}

/// Positive part `max(x, 0)`, smoothed when `width > 0`.
///
/// With `width == 0` the exact kink is returned (pathwise derivative 1 above
/// zero, 0 below). With `width > 0` this is `smooth_max(x, 0, width)`.
///
/// # Panics
/// Panics if width < 0
#[inline]
pub fn positive_part<T: Float>(x: T, width: T) -> T {
    assert!(width >= T::zero(), "width must be non-negative");
    if width == T::zero() {
        if x > T::zero() {
            x
        } else {
            T::zero()
        }
    } else {
        smooth_max(x, T::zero(), width)
    }
}

/// Heaviside step `1{x > 0}`, smoothed when `width > 0`.
///
/// With `width == 0` the exact indicator is returned and carries no
/// derivative. With `width > 0` this is `smooth_indicator(x, width)`.
///
/// # Panics
/// Panics if width < 0
#[inline]
pub fn step<T: Float>(x: T, width: T) -> T {
    assert!(width >= T::zero(), "width must be non-negative");
    if width == T::zero() {
        if x > T::zero() {
            T::one()
        } else {
            T::zero()
        }
    } else {
        smooth_indicator(x, width)
    }
}
