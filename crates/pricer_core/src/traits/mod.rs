//! Core numeric trait shared by every differentiable routine.
//!
//! Simulation, payoff evaluation, discounting and the hedging unroll are
//! all written once against [`Float`] and instantiated with `f64`,
//! `DualNumber` or `HyperDualNumber`. Variants are dispatched through
//! closed enums rather than `Box<dyn Trait>`, so each instantiation is
//! monomorphised.

/// Scalar type of every generic pricing routine.
///
/// Implemented by `f64` and by the dual and hyper-dual numbers in
/// [`crate::types::dual`], so one routine yields values and derivatives.
///
/// # Examples
/// ```
/// use pricer_core::traits::Float;
/// use pricer_core::types::dual::DualNumber;
///
/// fn discount<T: Float>(rate: T, time: T) -> T {
///     (-rate * time).exp()
/// }
///
/// assert!((discount(0.05, 1.0) - 0.951229).abs() < 1e-5);
///
/// // d/dr exp(−r t) = −t exp(−r t)
/// let d = discount(DualNumber::new(0.05, 1.0), DualNumber::new(2.0, 0.0));
/// assert!((d.eps + 2.0 * d.re).abs() < 1e-12);
/// ```
pub use num_traits::Float;
