//! Integration tests for dual number types flowing through smoothing kernels.

use approx::assert_relative_eq;
use pricer_core::math::smoothing::{positive_part, smooth_indicator, step};
use pricer_core::types::dual::{DualNumber, HyperDualNumber};
use pricer_core::types::TimeGrid;

/// Derivative of the smoothed positive part matches the sigmoid.
#[test]
fn test_positive_part_derivative_is_sigmoid() {
    let width = 0.25;
    for x in [-1.0, -0.1, 0.0, 0.3, 2.0] {
        let y = positive_part(DualNumber::new(x, 1.0), DualNumber::new(width, 0.0));
        let expected = smooth_indicator(x, width);
        assert_relative_eq!(y.eps, expected, epsilon = 1e-12);
    }
}

/// Exact step carries no derivative.
#[test]
fn test_exact_step_has_zero_derivative() {
    let y = step(DualNumber::new(0.4, 1.0), DualNumber::new(0.0, 0.0));
    assert_eq!(y.re, 1.0);
    assert_eq!(y.eps, 0.0);
}

/// Second derivative of the smoothed positive part through hyper-duals.
#[test]
fn test_positive_part_second_derivative() {
    let width = 0.5;
    let x = 0.2;
    let y = positive_part(
        HyperDualNumber::new(x, 1.0, 1.0, 0.0),
        HyperDualNumber::new(width, 0.0, 0.0, 0.0),
    );
    // d²/dx² w·ln(1 + exp(x/w)) = σ(x/w)(1 − σ(x/w)) / w
    let s = smooth_indicator(x, width);
    assert_relative_eq!(y.eps1eps2, s * (1.0 - s) / width, epsilon = 1e-10);
}

/// Grid step sizes carry ∂dt/∂T when maturity is a dual number.
#[test]
fn test_time_grid_scaled_steps_dual() {
    let grid = TimeGrid::new(vec![0.0, 0.25, 1.0]).unwrap();
    let steps = grid.scaled_steps(DualNumber::new(2.0, 1.0));
    assert_relative_eq!(steps[0].re, 0.5, epsilon = 1e-14);
    assert_relative_eq!(steps[0].eps, 0.25, epsilon = 1e-14);
    assert_relative_eq!(steps[1].re, 1.5, epsilon = 1e-14);
    assert_relative_eq!(steps[1].eps, 0.75, epsilon = 1e-14);
}
