//! Differentiable Monte Carlo pricing engine.
//!
//! The [`PricingEngine`] coordinates:
//! 1. Draw generation (via [`PricerRng`] into a [`DrawSet`])
//! 2. Path simulation (via [`simulate`](super::paths::simulate))
//! 3. Payoff evaluation (via [`PayoffSpec::evaluate`])
//! 4. Discounting `exp(−r·T)` and aggregation
//! 5. Sensitivities by dual numbers or bump-and-reprice, on the same draws
//!
//! The engine itself holds no mutable state: every call owns its random
//! source, so independent calls may run concurrently.

use pricer_core::types::{PricingError, TimeGrid};
use pricer_models::models::{ModelParameters, ParameterName, StochasticModel};
use tracing::{debug, warn};

use super::config::{GreekMode, MonteCarloConfig};
use crate::greeks::extractor::{Derivative, FiniteDifference, PricingProblem};
use crate::greeks::{Direction, Greek, PricingResult, Sensitivity};
use crate::path_dependent::PayoffSpec;
use crate::rng::{DrawSet, PricerRng};

/// Relative tolerance between a custom schedule's horizon and the payoff maturity.
const SCHEDULE_TOLERANCE: f64 = 1e-9;

/// Monte Carlo pricing engine.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::ModelParameters;
/// use pricer_pricing::greeks::Greek;
/// use pricer_pricing::mc::{MonteCarloConfig, PricingEngine};
/// use pricer_pricing::path_dependent::{OptionType, PayoffSpec};
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(20_000)
///     .n_steps(16)
///     .seed(42)
///     .antithetic(true)
///     .build()
///     .unwrap();
/// let engine = PricingEngine::new(config).unwrap();
///
/// let params = ModelParameters::gbm(100.0, 0.2, 0.05);
/// let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
/// let result = engine
///     .price_with_greeks(&params, &call, &[Greek::Delta, Greek::Vega])
///     .unwrap();
///
/// assert!((result.price - 10.45).abs() < 4.0 * result.std_error + 0.05);
/// assert!(result.get("delta").unwrap() > 0.5);
/// ```
#[derive(Clone, Debug)]
pub struct PricingEngine {
    config: MonteCarloConfig,
    schedule: Option<TimeGrid>,
}

impl PricingEngine {
    /// Creates an engine with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is invalid.
    pub fn new(config: MonteCarloConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self {
            config,
            schedule: None,
        })
    }

    /// Simulates on `schedule` instead of a uniform grid of `n_steps`.
    ///
    /// The schedule's horizon must equal the maturity of every payoff priced.
    pub fn with_schedule(mut self, schedule: TimeGrid) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Returns a reference to the configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Random source for one call: seeded from the configuration, or from
    /// entropy when no seed is configured.
    pub fn rng(&self) -> PricerRng {
        match self.config.seed() {
            Some(seed) => PricerRng::from_seed(seed),
            None => PricerRng::from_entropy(),
        }
    }

    /// Simulation grid for `payoff`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the payoff maturity is invalid or a custom
    /// schedule ends elsewhere.
    pub fn time_grid(&self, payoff: &PayoffSpec) -> Result<TimeGrid, PricingError> {
        payoff.validate()?;
        match &self.schedule {
            Some(schedule) => {
                let horizon = schedule.maturity();
                if (horizon - payoff.maturity).abs() > SCHEDULE_TOLERANCE * payoff.maturity {
                    return Err(PricingError::InvalidConfig(format!(
                        "schedule ends at {} but the payoff matures at {}",
                        horizon, payoff.maturity
                    )));
                }
                Ok(schedule.clone())
            }
            None => Ok(TimeGrid::uniform(payoff.maturity, self.config.n_steps())?),
        }
    }

    /// Draws for one pricing call of `params`.
    pub fn draws(
        &self,
        params: &ModelParameters,
        grid: &TimeGrid,
        rng: &mut PricerRng,
    ) -> Result<DrawSet, PricingError> {
        let model = params.lift_f64()?;
        Ok(DrawSet::generate(
            rng,
            self.config.n_paths(),
            grid.n_steps(),
            model.brownian_dim(),
            self.config.antithetic(),
        ))
    }

    /// Present value and standard error.
    ///
    /// # Errors
    ///
    /// - `InvalidModelParameters` for invalid model inputs
    /// - `NumericalInstability` for non-finite inputs or payoffs
    /// - `InvalidConfig` for invalid contract terms
    pub fn price(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
    ) -> Result<PricingResult, PricingError> {
        self.price_with_rng(params, payoff, &mut self.rng())
    }

    /// [`PricingEngine::price`] drawing from a caller-owned random source.
    pub fn price_with_rng(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        rng: &mut PricerRng,
    ) -> Result<PricingResult, PricingError> {
        self.run(params, payoff, rng, &[])
    }

    /// Price with generic sensitivities (`dV/d{name}[i]`, `d2V/d{a}[i]d{b}[j]`).
    ///
    /// # Errors
    ///
    /// `ParameterNotDifferentiable` if a requested parameter is fixed or not
    /// used by the process; otherwise as [`PricingEngine::price`].
    ///
    /// Maturity is the exception: it comes from the payoff, not the
    /// registry, so it cannot be fixed and `dV/dmaturity` (and theta) is
    /// always available.
    pub fn sensitivities(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        requests: &[Sensitivity],
    ) -> Result<PricingResult, PricingError> {
        self.sensitivities_with_rng(params, payoff, requests, &mut self.rng())
    }

    /// [`PricingEngine::sensitivities`] drawing from a caller-owned random source.
    pub fn sensitivities_with_rng(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        requests: &[Sensitivity],
        rng: &mut PricerRng,
    ) -> Result<PricingResult, PricingError> {
        let mut derivatives = Vec::new();
        for request in requests {
            match *request {
                Sensitivity::First(name) => {
                    for i in 0..components(params, name)? {
                        let dir = direction(name, i);
                        derivatives.push((format!("dV/d{}", dir), Derivative::First(dir), 1.0));
                    }
                }
                Sensitivity::Second(a, b) => {
                    let (na, nb) = (components(params, a)?, components(params, b)?);
                    for i in 0..na {
                        for j in 0..nb {
                            if a == b && j < i {
                                continue;
                            }
                            let (da, db) = (direction(a, i), direction(b, j));
                            derivatives.push((
                                format!("d2V/d{}d{}", da, db),
                                Derivative::Second(da, db),
                                1.0,
                            ));
                        }
                    }
                }
            }
        }
        self.run(params, payoff, rng, &derivatives)
    }

    /// Price with named Greeks.
    ///
    /// Per-asset Greeks of a basket are keyed `delta[0]`, `delta[1]`, …
    ///
    /// # Errors
    ///
    /// As [`PricingEngine::sensitivities`].
    pub fn price_with_greeks(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        greeks: &[Greek],
    ) -> Result<PricingResult, PricingError> {
        self.price_with_greeks_and_rng(params, payoff, greeks, &mut self.rng())
    }

    /// [`PricingEngine::price_with_greeks`] drawing from a caller-owned random source.
    pub fn price_with_greeks_and_rng(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        greeks: &[Greek],
        rng: &mut PricerRng,
    ) -> Result<PricingResult, PricingError> {
        let mut derivatives = Vec::new();
        for greek in greeks {
            let sign = greek.sign();
            match greek.sensitivity() {
                Sensitivity::First(name) => {
                    let n = components(params, name)?;
                    for i in 0..n {
                        derivatives.push((
                            greek_key(*greek, i, n),
                            Derivative::First(direction(name, i)),
                            sign,
                        ));
                    }
                }
                Sensitivity::Second(a, b) => {
                    let n = components(params, a)?;
                    let nb = components(params, b)?;
                    if n != nb {
                        return Err(PricingError::InvalidModelParameters(format!(
                            "{} needs matching components of {} and {}",
                            greek, a, b
                        )));
                    }
                    for i in 0..n {
                        derivatives.push((
                            greek_key(*greek, i, n),
                            Derivative::Second(direction(a, i), direction(b, i)),
                            sign,
                        ));
                    }
                }
            }
        }
        self.run(params, payoff, rng, &derivatives)
    }

    fn run(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        rng: &mut PricerRng,
        derivatives: &[(String, Derivative, f64)],
    ) -> Result<PricingResult, PricingError> {
        params.validate()?;
        let grid = self.time_grid(payoff)?;
        let draws = self.draws(params, &grid, rng)?;
        let width = payoff.effective_width(self.config.smoothing_width());

        debug!(
            process = %params.process_type(),
            payoff = payoff.kind.name(),
            n_paths = draws.n_samples(),
            n_steps = grid.n_steps(),
            antithetic = draws.is_antithetic(),
            width,
            "pricing"
        );

        let problem = PricingProblem {
            params,
            payoff,
            grid: &grid,
            draws: &draws,
            maturity: payoff.maturity,
            width,
        };
        let (price, std_error) = problem.price_and_error()?;
        let mut result = PricingResult::new(price, std_error, draws.n_samples());

        if derivatives.is_empty() {
            return Ok(result);
        }

        let mode = self.config.greek_mode();
        if mode == GreekMode::Autodiff && width == 0.0 && payoff.is_discontinuous() {
            warn!(
                payoff = payoff.kind.name(),
                "pathwise derivatives of a discontinuous payoff with zero smoothing width miss the jump contribution"
            );
        }

        let bumps = self.config.bumps();
        let mut fd = FiniteDifference::new(&problem, bumps, price);
        for (key, derivative, sign) in derivatives {
            let value = match (mode, *derivative) {
                (GreekMode::Autodiff, Derivative::First(dir)) => problem.autodiff_first(dir)?,
                (GreekMode::Autodiff, Derivative::Second(a, b)) => problem.autodiff_second(a, b)?,
                (GreekMode::FiniteDifference, d) => fd.derivative(d)?,
            };
            debug!(key = key.as_str(), value, mode = mode.as_str(), "sensitivity");
            result.sensitivities.insert(key.clone(), sign * value);
        }
        Ok(result)
    }
}

/// Component count of a differentiable input.
fn components(params: &ModelParameters, name: ParameterName) -> Result<usize, PricingError> {
    if name == ParameterName::Maturity {
        return Ok(1);
    }
    Ok(params.check_differentiable(name)?.values.len())
}

fn direction(name: ParameterName, component: usize) -> Direction {
    Direction { name, component }
}

fn greek_key(greek: Greek, component: usize, n_components: usize) -> String {
    if n_components == 1 {
        greek.as_str().to_string()
    } else {
        format!("{}[{}]", greek, component)
    }
}
