//! Sensitivity extraction on a fixed draw set.
//!
//! Every pass of one pricing call (the primal price, each dual or
//! hyper-dual pass, each bumped reprice) runs on the same [`DrawSet`], so
//! sensitivities are pathwise derivatives of the very estimator that
//! produced the price.
//!
//! # Autodiff
//!
//! First order: one `Dual64` pass per parameter component, seeding `eps = 1`
//! on that component and reading `eps` of the mean discounted payoff.
//! Second order: one `HyperDual64` pass per pair, seeding `eps1` on the first
//! and `eps2` on the second component and reading `eps1eps2`.
//!
//! # Finite differences
//!
//! Central differences with common random numbers. Where the downward (or
//! upward) bump leaves the parameter domain (negative volatility,
//! non-positive spot or maturity, …) the one-sided stencil is used instead.
//! Cross terms are the tensor product of the two first-order stencils
//! (the four-point formula in the central case).

use std::collections::HashMap;

use num_dual::{Dual64, HyperDual64};
use num_traits::Float;
use pricer_core::types::{PricingError, TimeGrid};
use pricer_models::models::{ModelParameters, ParameterName, StochasticModel};

use super::Direction;
use crate::mc::{simulate, BumpConfig};
use crate::path_dependent::PayoffSpec;
use crate::rng::DrawSet;

/// Primal part of a scalar.
#[inline]
pub(crate) fn primal<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// A derivative to extract.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Derivative {
    First(Direction),
    Second(Direction, Direction),
}

/// Inputs shared by every pass of one pricing call.
pub(crate) struct PricingProblem<'a> {
    pub params: &'a ModelParameters,
    pub payoff: &'a PayoffSpec,
    pub grid: &'a TimeGrid,
    pub draws: &'a DrawSet,
    pub maturity: f64,
    pub width: f64,
}

impl PricingProblem<'_> {
    /// Discounted payoff of every sample in scalar type `T`.
    ///
    /// `seed` maps each registry component to `T`; `maturity` is the
    /// horizon in `T`.
    ///
    /// # Errors
    /// Propagates model, simulation and payoff errors;
    /// `NumericalInstability` if any sample is not finite.
    pub fn discounted_payoffs<T, F>(
        &self,
        params: &ModelParameters,
        seed: F,
        maturity: T,
    ) -> Result<Vec<T>, PricingError>
    where
        T: Float + Send + Sync,
        F: Fn(ParameterName, usize, f64) -> T,
    {
        let model = params.lift(seed)?;
        let paths = simulate(&model, self.grid, maturity, self.draws)?;
        let times = self.grid.scaled_points(maturity);
        let rate = model.rate();
        let discount = (-rate * maturity).exp();
        let values: Vec<T> = self
            .payoff
            .evaluate(&paths, &times, rate, self.width)?
            .into_iter()
            .map(|v| v * discount)
            .collect();
        if let Some(i) = values.iter().position(|v| !primal(*v).is_finite()) {
            return Err(PricingError::NumericalInstability(format!(
                "non-finite discounted payoff {} on sample {}",
                primal(values[i]),
                i
            )));
        }
        Ok(values)
    }

    /// Price and standard error of the unbumped problem.
    ///
    /// The standard error is computed on equally weighted group averages
    /// (antithetic pairs count once) and is zero with fewer than two
    /// groups. An unpaired trailing antithetic sample is priced but left
    /// out of the error estimate.
    pub fn price_and_error(&self) -> Result<(f64, f64), PricingError> {
        let values = self.discounted_payoffs(self.params, |_, _, v| v, self.maturity)?;
        let price = mean(&values);

        let groups: Vec<f64> = self
            .draws
            .groups()
            .into_iter()
            .map(|range| mean(&values[range]))
            .collect();
        let n = groups.len();
        let std_error = if n < 2 {
            0.0
        } else {
            let g_mean = groups.iter().sum::<f64>() / n as f64;
            let var = groups.iter().map(|g| (g - g_mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            (var / n as f64).sqrt()
        };
        ensure_finite("price", price)?;
        Ok((price, std_error))
    }

    /// Reprice with the given component shifts applied.
    fn price_shifted(&self, shifts: &[(Direction, f64)]) -> Result<f64, PricingError> {
        let (params, maturity) = self.shifted(shifts)?;
        let values = self.discounted_payoffs(&params, |_, _, v| v, maturity)?;
        Ok(mean(&values))
    }

    fn shifted(&self, shifts: &[(Direction, f64)]) -> Result<(ModelParameters, f64), PricingError> {
        let mut params = self.params.clone();
        let mut maturity = self.maturity;
        for (dir, delta) in shifts {
            if dir.name == ParameterName::Maturity {
                maturity += delta;
            } else {
                params = params.bumped(dir.name, dir.component, *delta)?;
            }
        }
        Ok((params, maturity))
    }

    fn is_admissible(&self, shifts: &[(Direction, f64)]) -> bool {
        match self.shifted(shifts) {
            Ok((params, maturity)) => maturity > 0.0 && params.validate().is_ok(),
            Err(_) => false,
        }
    }

    /// `∂V/∂dir` by one dual-number pass.
    pub fn autodiff_first(&self, dir: Direction) -> Result<f64, PricingError> {
        let tangent = |name: ParameterName, component: usize| {
            if name == dir.name && component == dir.component {
                1.0
            } else {
                0.0
            }
        };
        let values = self.discounted_payoffs(
            self.params,
            |name, i, v| Dual64::new(v, tangent(name, i)),
            Dual64::new(self.maturity, tangent(ParameterName::Maturity, 0)),
        )?;
        let value = mean(&values).eps;
        ensure_finite(&format!("derivative along {}", dir), value)
    }

    /// `∂²V/∂a∂b` by one hyper-dual pass.
    pub fn autodiff_second(&self, a: Direction, b: Direction) -> Result<f64, PricingError> {
        let hits = |dir: Direction, name: ParameterName, component: usize| {
            if name == dir.name && component == dir.component {
                1.0
            } else {
                0.0
            }
        };
        let seed = |name: ParameterName, i: usize, v: f64| {
            HyperDual64::new(v, hits(a, name, i), hits(b, name, i), 0.0)
        };
        let maturity = HyperDual64::new(
            self.maturity,
            hits(a, ParameterName::Maturity, 0),
            hits(b, ParameterName::Maturity, 0),
            0.0,
        );
        let values = self.discounted_payoffs(self.params, seed, maturity)?;
        let value = mean(&values).eps1eps2;
        ensure_finite(&format!("derivative along {} and {}", a, b), value)
    }
}

fn mean<T: Float>(values: &[T]) -> T {
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    sum / T::from(values.len()).unwrap()
}

fn ensure_finite(what: &str, value: f64) -> Result<f64, PricingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::NumericalInstability(format!(
            "{} is not finite ({})",
            what, value
        )))
    }
}

/// Offsets (in bump units) and weights of a difference stencil.
type Stencil = Vec<(i32, f64)>;

/// Bump-and-reprice evaluator with memoised reprices.
pub(crate) struct FiniteDifference<'a, 'p> {
    problem: &'a PricingProblem<'p>,
    bumps: &'a BumpConfig,
    cache: HashMap<Vec<(Direction, i32)>, f64>,
}

impl<'a, 'p> FiniteDifference<'a, 'p> {
    pub fn new(problem: &'a PricingProblem<'p>, bumps: &'a BumpConfig, base_price: f64) -> Self {
        let mut cache = HashMap::new();
        cache.insert(Vec::new(), base_price);
        Self {
            problem,
            bumps,
            cache,
        }
    }

    /// Bump size for one component.
    fn step_size(&self, dir: Direction) -> Result<f64, PricingError> {
        let h = match dir.name {
            ParameterName::Spot => {
                let spot = self
                    .problem
                    .params
                    .get(ParameterName::Spot)
                    .and_then(|p| p.values.get(dir.component).copied())
                    .ok_or_else(|| {
                        PricingError::InvalidConfig(format!("no component {}", dir))
                    })?;
                self.bumps.spot_relative * spot
            }
            ParameterName::Volatility => self.bumps.volatility,
            ParameterName::Rate => self.bumps.rate,
            ParameterName::Maturity => self.bumps.maturity,
            _ => self.bumps.other,
        };
        Ok(h)
    }

    fn admissible(&self, dir: Direction, h: f64, k: i32) -> bool {
        self.problem.is_admissible(&[(dir, k as f64 * h)])
    }

    fn first_stencil(&self, dir: Direction, h: f64) -> Result<Stencil, PricingError> {
        let up = self.admissible(dir, h, 1);
        let down = self.admissible(dir, h, -1);
        match (up, down) {
            (true, true) => Ok(vec![(1, 0.5 / h), (-1, -0.5 / h)]),
            (true, false) => Ok(vec![(1, 1.0 / h), (0, -1.0 / h)]),
            (false, true) => Ok(vec![(0, 1.0 / h), (-1, -1.0 / h)]),
            (false, false) => Err(not_bumpable(dir, h)),
        }
    }

    fn second_stencil(&self, dir: Direction, h: f64) -> Result<Stencil, PricingError> {
        let h2 = h * h;
        if self.admissible(dir, h, 1) && self.admissible(dir, h, -1) {
            Ok(vec![(1, 1.0 / h2), (0, -2.0 / h2), (-1, 1.0 / h2)])
        } else if self.admissible(dir, h, 1) && self.admissible(dir, h, 2) {
            Ok(vec![(2, 1.0 / h2), (1, -2.0 / h2), (0, 1.0 / h2)])
        } else if self.admissible(dir, h, -1) && self.admissible(dir, h, -2) {
            Ok(vec![(0, 1.0 / h2), (-1, -2.0 / h2), (-2, 1.0 / h2)])
        } else {
            Err(not_bumpable(dir, h))
        }
    }

    fn reprice(&mut self, offsets: &[(Direction, i32, f64)]) -> Result<f64, PricingError> {
        let mut key: Vec<(Direction, i32)> = offsets
            .iter()
            .filter(|(_, k, _)| *k != 0)
            .map(|(d, k, _)| (*d, *k))
            .collect();
        key.sort();
        if let Some(v) = self.cache.get(&key) {
            return Ok(*v);
        }
        let shifts: Vec<(Direction, f64)> = offsets
            .iter()
            .filter(|(_, k, _)| *k != 0)
            .map(|(d, k, h)| (*d, *k as f64 * h))
            .collect();
        let value = self.problem.price_shifted(&shifts)?;
        self.cache.insert(key, value);
        Ok(value)
    }

    /// Finite-difference estimate of one derivative.
    pub fn derivative(&mut self, derivative: Derivative) -> Result<f64, PricingError> {
        let value = match derivative {
            Derivative::First(dir) => {
                let h = self.step_size(dir)?;
                let mut acc = 0.0;
                for (k, w) in self.first_stencil(dir, h)? {
                    acc += w * self.reprice(&[(dir, k, h)])?;
                }
                acc
            }
            Derivative::Second(a, b) if a == b => {
                let h = self.step_size(a)?;
                let mut acc = 0.0;
                for (k, w) in self.second_stencil(a, h)? {
                    acc += w * self.reprice(&[(a, k, h)])?;
                }
                acc
            }
            Derivative::Second(a, b) => {
                let ha = self.step_size(a)?;
                let hb = self.step_size(b)?;
                let sa = self.first_stencil(a, ha)?;
                let sb = self.first_stencil(b, hb)?;
                let mut acc = 0.0;
                for &(ka, wa) in &sa {
                    for &(kb, wb) in &sb {
                        acc += wa * wb * self.reprice(&[(a, ka, ha), (b, kb, hb)])?;
                    }
                }
                acc
            }
        };
        ensure_finite("finite-difference estimate", value)
    }
}

fn not_bumpable(dir: Direction, h: f64) -> PricingError {
    PricingError::InvalidModelParameters(format!(
        "{} cannot be bumped by {} in either direction",
        dir, h
    ))
}
