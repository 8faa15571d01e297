//! Simulated hedging scenarios and the unrolled P&L computation.

use num_traits::Float;
use pricer_core::types::time::TimeGrid;
use pricer_core::types::PricingError;
use pricer_models::models::{ModelParameters, ParameterName, StochasticModel};
use pricer_pricing::mc::simulate;
use pricer_pricing::path_dependent::PayoffSpec;
use pricer_pricing::rng::{DrawSet, PricerRng};

use super::policy::{HedgingPolicy, StateFeatures};

/// One batch of hedging scenarios in `f64`.
///
/// Everything here is a constant with respect to the policy parameters,
/// so the batch is shared by the loss pass and every directional pass.
#[derive(Debug, Clone)]
pub(crate) struct HedgeBatch {
    n_samples: usize,
    n_points: usize,
    /// exp(−r·t_k)·S_k of the hedge instrument, (sample, point)
    discounted: Vec<f64>,
    /// ln(S_k / reference), (sample, point)
    log_moneyness: Vec<f64>,
    /// T − t_k per point
    time_remaining: Vec<f64>,
    /// exp(−r·T)·payoff per sample
    discounted_payoff: Vec<f64>,
    /// Mean of `discounted_payoff`, credited at inception
    premium: f64,
}

impl HedgeBatch {
    /// Simulates `n_paths` scenarios of `params` for hedging `payoff` on
    /// `grid`.
    ///
    /// The hedge instrument is the payoff's basket (equal weights unless
    /// the payoff sets them). Payoffs are evaluated exactly unless the
    /// payoff carries its own smoothing width.
    pub(crate) fn simulate(
        params: &ModelParameters,
        payoff: &PayoffSpec,
        grid: &TimeGrid,
        n_paths: usize,
        antithetic: bool,
        rng: &mut PricerRng,
    ) -> Result<Self, PricingError> {
        params.validate()?;
        payoff.validate()?;
        let model = params.lift_f64()?;
        let rate = params.value(ParameterName::Rate)?;
        let weights = payoff.weights(model.n_assets())?;

        let draws = DrawSet::generate(
            rng,
            n_paths,
            grid.n_steps(),
            model.brownian_dim(),
            antithetic,
        );
        let paths = simulate(&model, grid, payoff.maturity, &draws)?;
        let times = grid.points();
        let maturity = grid.maturity();
        let payoffs = payoff.evaluate(&paths, times, rate, payoff.effective_width(0.0))?;

        let n_points = paths.n_points();
        let growth: Vec<f64> = times.iter().map(|&t| (-rate * t).exp()).collect();
        let mut discounted = Vec::with_capacity(n_paths * n_points);
        let mut log_moneyness = Vec::with_capacity(n_paths * n_points);
        for sample in 0..n_paths {
            let basket = paths.weighted_path(sample, &weights);
            let reference = if payoff.strike > 0.0 {
                payoff.strike
            } else {
                basket[0]
            };
            for (s, df) in basket.iter().zip(&growth) {
                discounted.push(s * df);
                log_moneyness.push((s / reference).ln());
            }
        }
        let discount = (-rate * maturity).exp();
        let discounted_payoff: Vec<f64> = payoffs.iter().map(|v| v * discount).collect();
        let premium = discounted_payoff.iter().sum::<f64>() / n_paths as f64;

        if discounted
            .iter()
            .chain(&log_moneyness)
            .chain(&discounted_payoff)
            .any(|v| !v.is_finite())
        {
            return Err(PricingError::NumericalInstability(
                "non-finite value in hedging scenarios".to_string(),
            ));
        }

        Ok(Self {
            n_samples: n_paths,
            n_points,
            discounted,
            log_moneyness,
            time_remaining: times.iter().map(|&t| maturity - t).collect(),
            discounted_payoff,
            premium,
        })
    }

    #[inline]
    pub(crate) fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Terminal P&L of every scenario:
    /// `premium + Σ δ_k ΔS̃_k − c Σ |δ_k − δ_{k−1}| S̃_k − payoff`.
    ///
    /// Positions are set at t_0..t_{n−1}; the entry trade pays costs, the
    /// terminal unwind does not.
    pub(crate) fn pnl<T: Float>(
        &self,
        policy: &HedgingPolicy,
        theta: &[T],
        cost_rate: f64,
    ) -> Vec<T> {
        let c = T::from(cost_rate).unwrap();
        let premium = T::from(self.premium).unwrap();
        (0..self.n_samples)
            .map(|sample| {
                let row = sample * self.n_points;
                let prices = &self.discounted[row..row + self.n_points];
                let moneyness = &self.log_moneyness[row..row + self.n_points];
                let mut previous = T::zero();
                let mut gains = T::zero();
                let mut costs = T::zero();
                for k in 0..self.n_points - 1 {
                    let features = StateFeatures {
                        log_moneyness: T::from(moneyness[k]).unwrap(),
                        time_remaining: T::from(self.time_remaining[k]).unwrap(),
                        previous_position: previous,
                    };
                    let position = policy.position(theta, &features);
                    let price = T::from(prices[k]).unwrap();
                    costs = costs + c * (position - previous).abs() * price;
                    gains = gains + position * (T::from(prices[k + 1]).unwrap() - price);
                    previous = position;
                }
                premium + gains - costs - T::from(self.discounted_payoff[sample]).unwrap()
            })
            .collect()
    }

    /// Terminal P&L with no hedge at all.
    pub(crate) fn unhedged_pnl(&self) -> Vec<f64> {
        self.discounted_payoff
            .iter()
            .map(|v| self.premium - v)
            .collect()
    }
}
