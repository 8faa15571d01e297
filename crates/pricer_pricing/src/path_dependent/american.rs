//! Early exercise by Longstaff-Schwartz regression.
//!
//! Exercise is allowed at every grid point after inception. Working
//! backwards from maturity, the discounted future cash flow of each
//! in-the-money path is regressed on the basis `{1, m, m²}` with
//! `m = underlying / strike`, giving a continuation estimate `C(m)`.
//!
//! The regression runs on primal (`f64`) values only, so the exercise
//! boundary is a deterministic function of the draws and identical across
//! the primal, dual and hyper-dual passes of one pricing call. Derivatives
//! flow through the exercise values and the path, not through the boundary.
//!
//! With width 0 a path exercises when its exercise value exceeds `C`. With
//! width > 0 the decision is the weight `σ((E − C)/width)` and the cash flow
//! is the corresponding blend of exercising and continuing (soft exercise).
//!
//! Cash flows are carried forward to maturity at the model rate, so the
//! engine's uniform `exp(−rT)` discount returns their value at inception.

use num_traits::Float;
use pricer_core::math::linalg::least_squares;
use pricer_core::math::smoothing::step;

use super::OptionType;

/// Regression basis size.
const BASIS_SIZE: usize = 3;

#[inline]
fn primal<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

#[inline]
fn basis(moneyness: f64) -> [f64; BASIS_SIZE] {
    [1.0, moneyness, moneyness * moneyness]
}

/// American option priced by least-squares Monte Carlo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmericanExercise {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: f64,
    /// Smoothing width (0 = hard exercise decisions).
    pub width: f64,
}

impl AmericanExercise {
    /// Per-path cash flows, valued at maturity.
    ///
    /// `paths[i]` is the underlying along sample `i` at the grid points
    /// `times` (with `times[0] = 0` and the last entry the maturity).
    /// Dates with fewer than three in-the-money paths, or a singular
    /// regression, are skipped (no exercise).
    pub fn cashflows<T: Float>(&self, paths: &[Vec<T>], times: &[T], rate: T) -> Vec<T> {
        let last = times.len() - 1;
        let maturity = times[last];
        let strike = T::from(self.strike).unwrap();
        let width = T::from(self.width).unwrap();

        let mut cash: Vec<T> = paths
            .iter()
            .map(|p| self.option_type.payoff(p[last], strike, width))
            .collect();

        for point in (1..last).rev() {
            let growth = (rate * (maturity - times[point])).exp();
            let growth_primal = primal(growth);

            let itm: Vec<usize> = (0..paths.len())
                .filter(|&i| self.option_type.intrinsic(primal(paths[i][point]), self.strike) > 0.0)
                .collect();
            if itm.len() < BASIS_SIZE {
                continue;
            }

            let design: Vec<Vec<f64>> = itm
                .iter()
                .map(|&i| basis(primal(paths[i][point]) / self.strike).to_vec())
                .collect();
            let targets: Vec<f64> = itm
                .iter()
                .map(|&i| primal(cash[i]) / growth_primal)
                .collect();
            let beta = match least_squares(&design, &targets) {
                Some(beta) => beta,
                None => continue,
            };

            for (&i, row) in itm.iter().zip(&design) {
                let continuation: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
                let exercise = self.option_type.payoff(paths[i][point], strike, width);
                let weight = step(exercise - T::from(continuation).unwrap(), width);
                cash[i] = weight * exercise * growth + (T::one() - weight) * cash[i];
            }
        }

        cash
    }
}
