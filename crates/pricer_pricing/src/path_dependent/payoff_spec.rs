//! PayoffSpec: the closed set of contracts the engine prices.
//!
//! A [`PayoffSpec`] names the contract variant together with its terms and
//! dispatches to the payoff structs through a `match`, never a trait object,
//! so one contract evaluates in `f64`, `Dual64` and `HyperDual64` alike.
//!
//! Multi-asset paths are reduced to a single underlying `Σ wᵢ Sᵢ(t)` before
//! the payoff sees them. Without explicit weights a single asset uses weight
//! 1 and a basket the equal weights 1/n.
//!
//! Monitoring conventions:
//!
//! | Variant   | Points observed                  |
//! |-----------|----------------------------------|
//! | European  | maturity only                    |
//! | Asian     | t₁ … t_N (inception excluded)    |
//! | Barrier   | t₀ … t_N                         |
//! | Lookback  | t₀ … t_N                         |
//! | American  | exercise at t₁ … t_N             |

use num_traits::Float;
use pricer_core::types::PricingError;
use rayon::prelude::*;

use super::{
    AmericanExercise, AsianPayoff, Averaging, BarrierPayoff, BarrierType, EuropeanPayoff,
    LookbackPayoff, LookbackType, OptionType, PathDependentPayoff, PathObserver,
};
use crate::mc::PathBatch;

/// Contract variant with its variant-specific terms.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum PayoffKind {
    /// Terminal payoff.
    European,
    /// Average-price option.
    Asian {
        /// Averaging convention.
        averaging: Averaging,
    },
    /// Knock-in / knock-out option.
    Barrier {
        /// Direction and knock type.
        barrier_type: BarrierType,
        /// Barrier level.
        barrier: f64,
    },
    /// Extremum option.
    Lookback {
        /// Fixed or floating strike.
        lookback_type: LookbackType,
    },
    /// Early exercise on every grid point after inception.
    American,
}

impl PayoffKind {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            PayoffKind::European => "european",
            PayoffKind::Asian { .. } => "asian",
            PayoffKind::Barrier { .. } => "barrier",
            PayoffKind::Lookback { .. } => "lookback",
            PayoffKind::American => "american",
        }
    }
}

/// A priced contract: variant, direction, strike, maturity and smoothing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayoffSpec {
    /// Contract variant.
    pub kind: PayoffKind,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price (unused by floating lookbacks).
    pub strike: f64,
    /// Time to maturity in years.
    pub maturity: f64,
    /// Basket weights, one per asset.
    #[cfg_attr(feature = "serde", serde(default))]
    pub basket_weights: Option<Vec<f64>>,
    /// Smoothing width overriding the engine default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub smoothing_width: Option<f64>,
}

impl PayoffSpec {
    fn with_kind(kind: PayoffKind, option_type: OptionType, strike: f64, maturity: f64) -> Self {
        Self {
            kind,
            option_type,
            strike,
            maturity,
            basket_weights: None,
            smoothing_width: None,
        }
    }

    /// European option.
    pub fn european(option_type: OptionType, strike: f64, maturity: f64) -> Self {
        Self::with_kind(PayoffKind::European, option_type, strike, maturity)
    }

    /// Asian option.
    pub fn asian(averaging: Averaging, option_type: OptionType, strike: f64, maturity: f64) -> Self {
        Self::with_kind(PayoffKind::Asian { averaging }, option_type, strike, maturity)
    }

    /// Barrier option.
    pub fn barrier(
        barrier_type: BarrierType,
        barrier: f64,
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Self {
        Self::with_kind(
            PayoffKind::Barrier {
                barrier_type,
                barrier,
            },
            option_type,
            strike,
            maturity,
        )
    }

    /// Lookback option.
    pub fn lookback(
        lookback_type: LookbackType,
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Self {
        Self::with_kind(PayoffKind::Lookback { lookback_type }, option_type, strike, maturity)
    }

    /// American option.
    pub fn american(option_type: OptionType, strike: f64, maturity: f64) -> Self {
        Self::with_kind(PayoffKind::American, option_type, strike, maturity)
    }

    /// Sets basket weights.
    pub fn with_basket_weights(mut self, weights: Vec<f64>) -> Self {
        self.basket_weights = Some(weights);
        self
    }

    /// Sets a smoothing width for this contract.
    pub fn with_smoothing_width(mut self, width: f64) -> Self {
        self.smoothing_width = Some(width);
        self
    }

    /// Width used for this contract given the engine default.
    #[inline]
    pub fn effective_width(&self, default_width: f64) -> f64 {
        self.smoothing_width.unwrap_or(default_width)
    }

    /// True when the exact payoff jumps in the path.
    pub fn is_discontinuous(&self) -> bool {
        match self.kind {
            PayoffKind::Barrier {
                barrier_type,
                barrier,
            } => {
                let payoff = BarrierPayoff {
                    barrier_type,
                    barrier,
                    option_type: self.option_type,
                    strike: self.strike,
                    width: 0.0,
                };
                PathDependentPayoff::<f64>::is_discontinuous(&payoff)
            }
            // The exercise decision is a hard switch at width 0.
            PayoffKind::American => true,
            _ => false,
        }
    }

    /// Basket weights for `n_assets`.
    ///
    /// # Errors
    /// `InvalidConfig` if explicit weights do not match the asset count or
    /// are not finite.
    pub fn weights(&self, n_assets: usize) -> Result<Vec<f64>, PricingError> {
        match &self.basket_weights {
            Some(w) if w.len() != n_assets => Err(PricingError::InvalidConfig(format!(
                "{} basket weights for {} assets",
                w.len(),
                n_assets
            ))),
            Some(w) if w.iter().any(|x| !x.is_finite()) => Err(PricingError::InvalidConfig(
                "basket weights must be finite".to_string(),
            )),
            Some(w) => Ok(w.clone()),
            None if n_assets == 0 => Err(PricingError::InvalidConfig(
                "payoff needs at least one asset".to_string(),
            )),
            None => Ok(vec![1.0 / n_assets as f64; n_assets]),
        }
    }

    /// Checks the contract terms.
    ///
    /// # Errors
    /// `InvalidConfig` for a non-finite or negative strike, a maturity that
    /// is not finite and positive, a non-positive barrier or a negative
    /// smoothing width.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.strike.is_finite() && self.strike >= 0.0) {
            return Err(PricingError::InvalidConfig(format!(
                "strike must be finite and non-negative, got {}",
                self.strike
            )));
        }
        if !(self.maturity.is_finite() && self.maturity > 0.0) {
            return Err(PricingError::InvalidConfig(format!(
                "maturity must be finite and positive, got {}",
                self.maturity
            )));
        }
        if let PayoffKind::Barrier { barrier, .. } = self.kind {
            if !(barrier.is_finite() && barrier > 0.0) {
                return Err(PricingError::InvalidConfig(format!(
                    "barrier must be finite and positive, got {}",
                    barrier
                )));
            }
        }
        if let Some(w) = self.smoothing_width {
            if !(w.is_finite() && w >= 0.0) {
                return Err(PricingError::InvalidConfig(format!(
                    "smoothing width must be finite and non-negative, got {}",
                    w
                )));
            }
        }
        if matches!(self.kind, PayoffKind::American) && self.strike <= 0.0 {
            return Err(PricingError::InvalidConfig(
                "american exercise needs a positive strike".to_string(),
            ));
        }
        Ok(())
    }

    /// Undiscounted payoff of every sample.
    ///
    /// `times` are the time points of `paths` in the scalar type (so that a
    /// differentiated maturity reaches early-exercise growth factors) and
    /// `rate` is the model's risk-free rate. The batch is not modified.
    ///
    /// # Errors
    /// `InvalidConfig` for invalid terms or basket weights,
    /// `InvalidModelParameters` if `times` does not match the batch.
    pub fn evaluate<T>(
        &self,
        paths: &PathBatch<T>,
        times: &[T],
        rate: T,
        width: f64,
    ) -> Result<Vec<T>, PricingError>
    where
        T: Float + Send + Sync,
    {
        self.validate()?;
        if times.len() != paths.n_points() || times.len() < 2 {
            return Err(PricingError::InvalidModelParameters(format!(
                "{} time points for a batch with {} points",
                times.len(),
                paths.n_points()
            )));
        }
        let weights: Vec<T> = self
            .weights(paths.n_assets())?
            .into_iter()
            .map(|w| T::from(w).unwrap())
            .collect();
        let underlying = |sample: usize| paths.weighted_path(sample, &weights);

        let option_type = self.option_type;
        let strike = self.strike;
        let values = match self.kind {
            PayoffKind::European => {
                let payoff = EuropeanPayoff {
                    option_type,
                    strike,
                    width,
                };
                observe_each(paths.n_samples(), |s| {
                    let path = underlying(s);
                    payoff.compute(&PathObserver::from_prices(&path[path.len() - 1..]))
                })
            }
            PayoffKind::Asian { averaging } => {
                let payoff = AsianPayoff {
                    averaging,
                    option_type,
                    strike,
                    width,
                };
                observe_each(paths.n_samples(), |s| {
                    payoff.compute(&PathObserver::from_prices(&underlying(s)[1..]))
                })
            }
            PayoffKind::Barrier {
                barrier_type,
                barrier,
            } => {
                let payoff = BarrierPayoff {
                    barrier_type,
                    barrier,
                    option_type,
                    strike,
                    width,
                };
                observe_each(paths.n_samples(), |s| {
                    payoff.compute(&PathObserver::from_prices(&underlying(s)))
                })
            }
            PayoffKind::Lookback { lookback_type } => {
                let payoff = LookbackPayoff {
                    lookback_type,
                    option_type,
                    strike,
                    width,
                };
                observe_each(paths.n_samples(), |s| {
                    payoff.compute(&PathObserver::from_prices(&underlying(s)))
                })
            }
            PayoffKind::American => {
                let exercise = AmericanExercise {
                    option_type,
                    strike,
                    width,
                };
                let all: Vec<Vec<T>> = (0..paths.n_samples())
                    .into_par_iter()
                    .map(underlying)
                    .collect();
                exercise.cashflows(&all, times, rate)
            }
        };
        Ok(values)
    }
}

fn observe_each<T, F>(n_samples: usize, payoff: F) -> Vec<T>
where
    T: Float + Send + Sync,
    F: Fn(usize) -> T + Sync + Send,
{
    (0..n_samples).into_par_iter().map(payoff).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::simulate;
    use crate::rng::{DrawSet, PricerRng};
    use approx::assert_relative_eq;
    use pricer_core::types::TimeGrid;
    use pricer_models::models::ModelParameters;

    fn deterministic_batch(spot: f64, rate: f64, n_steps: usize) -> (PathBatch<f64>, Vec<f64>) {
        let model = ModelParameters::gbm(spot, 0.0, rate).lift_f64().unwrap();
        let grid = TimeGrid::uniform(1.0, n_steps).unwrap();
        let draws = DrawSet::generate(&mut PricerRng::from_seed(1), 4, n_steps, 1, false);
        let batch = simulate(&model, &grid, 1.0, &draws).unwrap();
        (batch, grid.points().to_vec())
    }

    #[test]
    fn test_european_on_forward_path() {
        let (batch, times) = deterministic_batch(100.0, 0.05, 4);
        let spec = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
        let values = spec.evaluate(&batch, &times, 0.05, 0.0).unwrap();
        let forward = 100.0 * 0.05_f64.exp();
        for v in values {
            assert_relative_eq!(v, forward - 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_asian_excludes_inception() {
        let (batch, times) = deterministic_batch(100.0, 0.04, 4);
        let spec = PayoffSpec::asian(Averaging::Arithmetic, OptionType::Call, 0.0, 1.0);
        let values = spec.evaluate(&batch, &times, 0.04, 0.0).unwrap();
        let expected: f64 = (1..=4)
            .map(|i| 100.0 * (0.04 * i as f64 / 4.0).exp())
            .sum::<f64>()
            / 4.0;
        assert_relative_eq!(values[0], expected, epsilon = 1e-9);
    }

    #[test]
    fn test_barrier_includes_inception() {
        let (batch, times) = deterministic_batch(100.0, -0.05, 4);
        // Only the spot at t0 is above the barrier; the path falls afterwards.
        let spec = PayoffSpec::barrier(BarrierType::UpIn, 99.9, OptionType::Put, 100.0, 1.0);
        let values = spec.evaluate(&batch, &times, -0.05, 0.0).unwrap();
        assert!(values[0] > 0.0);
    }

    #[test]
    fn test_basket_default_weights() {
        let params = ModelParameters::gbm_basket(vec![100.0, 50.0], vec![0.0, 0.0], 0.0, None);
        let model = params.lift_f64().unwrap();
        let grid = TimeGrid::uniform(1.0, 2).unwrap();
        let draws = DrawSet::generate(&mut PricerRng::from_seed(3), 2, 2, 2, false);
        let batch = simulate(&model, &grid, 1.0, &draws).unwrap();
        let spec = PayoffSpec::european(OptionType::Call, 70.0, 1.0);
        let values = spec.evaluate(&batch, grid.points(), 0.0, 0.0).unwrap();
        assert_relative_eq!(values[0], 5.0, epsilon = 1e-12);

        let weighted = spec.clone().with_basket_weights(vec![1.0, 0.0]);
        let values = weighted.evaluate(&batch, grid.points(), 0.0, 0.0).unwrap();
        assert_relative_eq!(values[0], 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_mismatch_is_config_error() {
        let (batch, times) = deterministic_batch(100.0, 0.0, 2);
        let spec = PayoffSpec::european(OptionType::Call, 100.0, 1.0)
            .with_basket_weights(vec![0.5, 0.5]);
        assert!(matches!(
            spec.evaluate(&batch, &times, 0.0, 0.0),
            Err(PricingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_terms() {
        assert!(PayoffSpec::european(OptionType::Call, -1.0, 1.0).validate().is_err());
        assert!(PayoffSpec::european(OptionType::Call, 100.0, 0.0).validate().is_err());
        assert!(PayoffSpec::barrier(BarrierType::UpOut, f64::NAN, OptionType::Call, 100.0, 1.0)
            .validate()
            .is_err());
        assert!(PayoffSpec::european(OptionType::Put, 100.0, 1.0)
            .with_smoothing_width(-0.1)
            .validate()
            .is_err());
        assert!(PayoffSpec::american(OptionType::Put, 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_discontinuity_flags() {
        assert!(!PayoffSpec::european(OptionType::Call, 100.0, 1.0).is_discontinuous());
        assert!(PayoffSpec::barrier(BarrierType::DownOut, 80.0, OptionType::Call, 100.0, 1.0)
            .is_discontinuous());
        assert!(PayoffSpec::american(OptionType::Put, 100.0, 1.0).is_discontinuous());
    }

    #[test]
    fn test_effective_width() {
        let spec = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
        assert_eq!(spec.effective_width(0.5), 0.5);
        assert_eq!(spec.with_smoothing_width(0.0).effective_width(0.5), 0.0);
    }

    #[test]
    fn test_floating_lookback_flat_path_is_zero() {
        let model = ModelParameters::gbm(100.0, 0.0, 0.0).lift_f64().unwrap();
        let grid = TimeGrid::uniform(1.0, 1).unwrap();
        let draws = DrawSet::generate(&mut PricerRng::from_seed(9), 1, 1, 1, false);
        let batch = simulate(&model, &grid, 1.0, &draws).unwrap();
        let spec = PayoffSpec::lookback(LookbackType::Floating, OptionType::Call, 0.0, 1.0);
        assert_eq!(spec.evaluate(&batch, grid.points(), 0.0, 0.0).unwrap(), vec![0.0]);
    }
}
