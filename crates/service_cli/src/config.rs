//! Layered CLI settings.
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables prefixed with `HEDGER__`, using `__` between nested keys
//! (`HEDGER__SIMULATION__N_PATHS=50000`).
//!
//! ```toml
//! [model]
//! process_type = "gbm"
//! spot = 100.0
//! volatility = 0.2
//! rate = 0.03
//!
//! [payoff]
//! payoff_type = "european"
//! option_type = "call"
//! strike = 100.0
//! maturity = 1.0
//!
//! [simulation]
//! n_paths = 50000
//! n_steps = 50
//! seed = 42
//! ```

use std::path::Path;

use chrono::NaiveDate;
use ::config::{Config, Environment, File, FileFormat};
use pricer_core::types::time::{DayCountConvention, TimeGrid};
use pricer_core::types::PricingError;
use pricer_models::models::{CorrelationMatrix, ModelParameters, ParameterName, ProcessType};
use pricer_optimiser::hedging::{HedgingPolicy, RiskMeasure, TrainingConfig};
use pricer_optimiser::solvers::OptimizerType;
use pricer_pricing::mc::{BumpConfig, GreekMode, MonteCarloConfig, PricingEngine};
use pricer_pricing::path_dependent::{Averaging, BarrierType, LookbackType, OptionType, PayoffSpec};
use serde::Deserialize;

use crate::{CliError, Result};

/// File read when no `--config` is given; it may be absent.
pub const DEFAULT_CONFIG_FILE: &str = "hedger.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "HEDGER";

/// Hidden units of an MLP policy when `hidden_units` is unset.
pub const DEFAULT_HIDDEN_UNITS: usize = 16;

/// Complete CLI settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Underlying process
    pub model: ModelSettings,
    /// Contract
    pub payoff: PayoffSettings,
    /// Monte Carlo engine
    pub simulation: SimulationSettings,
    /// Hedge training; required by `train` only
    #[serde(default)]
    pub training: Option<TrainingSettings>,
}

impl Settings {
    /// Loads settings from `path` (or [`DEFAULT_CONFIG_FILE`] if `None`)
    /// and applies environment overrides.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !Path::new(path).exists() {
                    return Err(CliError::FileNotFound(path.to_string()));
                }
                File::with_name(path)
            }
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let config = Config::builder()
            .add_source(file)
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parses settings from TOML text, without environment overrides.
    #[cfg(test)]
    pub fn from_toml(text: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Training section, or an error naming it.
    pub fn training(&self) -> Result<&TrainingSettings> {
        self.training
            .as_ref()
            .ok_or_else(|| CliError::InvalidArgument("missing [training] section".to_string()))
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// A scalar or a per-asset list.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    /// Single asset
    One(f64),
    /// One value per asset
    Many(Vec<f64>),
}

impl OneOrMany {
    /// Components as a vector.
    pub fn values(&self) -> Vec<f64> {
        match self {
            OneOrMany::One(v) => vec![*v],
            OneOrMany::Many(v) => v.clone(),
        }
    }

    fn scalar(&self, name: &str) -> Result<f64> {
        match self.values().as_slice() {
            [v] => Ok(*v),
            other => Err(CliError::InvalidArgument(format!(
                "{} must be a single value for this process, got {} values",
                name,
                other.len()
            ))),
        }
    }
}

/// `[model]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelSettings {
    /// gbm, heston or local-vol
    pub process_type: ProcessType,
    /// Initial price, or one per asset for a GBM basket
    pub spot: OneOrMany,
    /// Volatility (Heston: initial instantaneous volatility)
    pub volatility: OneOrMany,
    /// Continuously compounded risk-free rate
    pub rate: f64,
    /// Heston κ
    pub mean_reversion: Option<f64>,
    /// Heston θ
    pub long_run_variance: Option<f64>,
    /// Heston ξ
    pub vol_of_vol: Option<f64>,
    /// Heston spot/variance correlation
    pub correlation: Option<f64>,
    /// Local volatility skew
    pub skew: Option<f64>,
    /// Local volatility smile
    pub smile: Option<f64>,
    /// Row-major correlation matrix between basket assets
    pub asset_correlation: Option<Vec<f64>>,
    /// Parameters excluded from differentiation
    #[serde(default)]
    pub fixed: Vec<String>,
}

impl ModelSettings {
    /// Builds and validates the model parameter registry.
    pub fn parameters(&self) -> Result<ModelParameters> {
        let spots = self.spot.values();
        let volatilities = self.volatility.values();
        let params = match self.process_type {
            ProcessType::Gbm if spots.len() == 1 && self.asset_correlation.is_none() => {
                ModelParameters::gbm(spots[0], self.volatility.scalar("volatility")?, self.rate)
            }
            ProcessType::Gbm => {
                let correlation = self
                    .asset_correlation
                    .as_deref()
                    .map(|data| CorrelationMatrix::new(data, spots.len()))
                    .transpose()
                    .map_err(PricingError::from)?;
                ModelParameters::gbm_basket(spots, volatilities, self.rate, correlation)
            }
            ProcessType::Heston => ModelParameters::heston(
                self.spot.scalar("spot")?,
                self.volatility.scalar("volatility")?,
                self.rate,
                required(self.mean_reversion, "mean_reversion")?,
                required(self.long_run_variance, "long_run_variance")?,
                required(self.vol_of_vol, "vol_of_vol")?,
                required(self.correlation, "correlation")?,
            ),
            ProcessType::LocalVol => ModelParameters::local_vol(
                self.spot.scalar("spot")?,
                self.volatility.scalar("volatility")?,
                self.rate,
                required(self.skew, "skew")?,
                required(self.smile, "smile")?,
            ),
        };
        let params = self.fixed.iter().try_fold(params, |params, name| {
            name.parse::<ParameterName>()
                .map(|name| params.fixed(name))
                .map_err(CliError::InvalidArgument)
        })?;
        params.validate()?;
        Ok(params)
    }
}

/// Contract family in `[payoff]`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PayoffType {
    /// Terminal payoff
    European,
    /// Average-price payoff
    Asian,
    /// Knock-in / knock-out payoff
    Barrier,
    /// Extremum payoff
    Lookback,
    /// Early exercise
    American,
}

/// `[payoff]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct PayoffSettings {
    /// Contract family
    pub payoff_type: PayoffType,
    /// call or put
    pub option_type: OptionType,
    /// Strike K
    pub strike: f64,
    /// Maturity in years
    pub maturity: f64,
    /// Asian averaging
    pub averaging: Option<Averaging>,
    /// up-in, up-out, down-in or down-out
    pub barrier_type: Option<BarrierType>,
    /// Barrier level
    pub barrier: Option<f64>,
    /// fixed or floating strike lookback
    pub lookback_type: Option<LookbackType>,
    /// Basket weights for multi-asset models
    pub basket_weights: Option<Vec<f64>>,
    /// Smoothing width overriding the engine default
    pub smoothing_width: Option<f64>,
}

impl PayoffSettings {
    /// Builds and validates the payoff.
    pub fn payoff(&self) -> Result<PayoffSpec> {
        let (option_type, strike, maturity) = (self.option_type, self.strike, self.maturity);
        let mut payoff = match self.payoff_type {
            PayoffType::European => PayoffSpec::european(option_type, strike, maturity),
            PayoffType::Asian => PayoffSpec::asian(
                required(self.averaging, "averaging")?,
                option_type,
                strike,
                maturity,
            ),
            PayoffType::Barrier => PayoffSpec::barrier(
                required(self.barrier_type, "barrier_type")?,
                required(self.barrier, "barrier")?,
                option_type,
                strike,
                maturity,
            ),
            PayoffType::Lookback => PayoffSpec::lookback(
                required(self.lookback_type, "lookback_type")?,
                option_type,
                strike,
                maturity,
            ),
            PayoffType::American => PayoffSpec::american(option_type, strike, maturity),
        };
        if let Some(weights) = &self.basket_weights {
            payoff = payoff.with_basket_weights(weights.clone());
        }
        if let Some(width) = self.smoothing_width {
            payoff = payoff.with_smoothing_width(width);
        }
        payoff.validate()?;
        Ok(payoff)
    }
}

/// `[simulation]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSettings {
    /// Monte Carlo paths
    pub n_paths: usize,
    /// Time steps of the uniform grid
    pub n_steps: usize,
    /// Seed; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Antithetic pairs
    #[serde(default)]
    pub use_antithetic: bool,
    /// autodiff or finite-difference
    #[serde(default)]
    pub greek_mode: GreekMode,
    /// Default smoothing width in price units
    #[serde(default)]
    pub smoothing_width: f64,
    /// Finite-difference bump sizes
    #[serde(default)]
    pub bumps: BumpConfig,
    /// Explicit observation times replacing the uniform grid
    pub schedule: Option<Vec<f64>>,
    /// Calendar schedule replacing the uniform grid
    pub calendar: Option<CalendarSettings>,
}

/// `[simulation.calendar]` section: observation dates converted to year
/// fractions from the valuation date.
#[derive(Debug, Deserialize, Clone)]
pub struct CalendarSettings {
    /// Date of t = 0
    pub valuation_date: NaiveDate,
    /// Increasing observation dates, the last one being expiry
    pub observation_dates: Vec<NaiveDate>,
    /// ACT/365 unless set
    #[serde(default)]
    pub day_count: DayCountConvention,
}

impl SimulationSettings {
    /// Validated engine configuration.
    pub fn config(&self) -> Result<MonteCarloConfig> {
        let mut builder = MonteCarloConfig::builder()
            .n_paths(self.n_paths)
            .n_steps(self.n_steps)
            .antithetic(self.use_antithetic)
            .greek_mode(self.greek_mode)
            .smoothing_width(self.smoothing_width)
            .bumps(self.bumps);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build().map_err(|e| CliError::Pricing(e.into()))
    }

    /// Engine over the configured grid or schedule.
    pub fn engine(&self) -> Result<PricingEngine> {
        let engine = PricingEngine::new(self.config()?)?;
        let schedule = match (&self.schedule, &self.calendar) {
            (Some(_), Some(_)) => {
                return Err(CliError::InvalidArgument(
                    "set either schedule or calendar, not both".to_string(),
                ))
            }
            (Some(points), None) => Some(TimeGrid::new(points.clone())),
            (None, Some(calendar)) => Some(TimeGrid::from_dates(
                calendar.valuation_date,
                &calendar.observation_dates,
                calendar.day_count,
            )),
            (None, None) => None,
        };
        Ok(match schedule {
            Some(grid) => engine.with_schedule(grid.map_err(PricingError::from)?),
            None => engine,
        })
    }
}

/// Policy family trained by `train`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Affine in the state features
    #[default]
    Linear,
    /// One hidden tanh layer
    Mlp,
}

/// `[training]` section. Unset optimiser fields keep the
/// [`TrainingConfig`] builder defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct TrainingSettings {
    /// Paths per iteration
    pub n_paths: usize,
    /// Rebalancing steps
    pub n_steps: usize,
    /// Seed of training batches and MLP initialisation
    pub seed: Option<u64>,
    /// Antithetic training batches
    #[serde(default)]
    pub use_antithetic: bool,
    /// Policy family
    #[serde(default)]
    pub policy: PolicyKind,
    /// MLP hidden units
    pub hidden_units: Option<usize>,
    /// sgd or adam
    pub optimizer_type: Option<OptimizerType>,
    /// Step size
    pub learning_rate: Option<f64>,
    /// Iteration cap
    pub max_iterations: Option<usize>,
    /// Windowed loss change below which training stops
    pub convergence_tolerance: Option<f64>,
    /// Window of the convergence test
    pub convergence_window: Option<usize>,
    /// Gradient clipping threshold
    pub max_grad_norm: Option<f64>,
    /// Set to false to disable clipping
    pub clip_gradients: Option<bool>,
    /// Proportional transaction cost rate
    pub transaction_cost_rate: Option<f64>,
    /// variance, mean-squared, expected-shortfall[:level] or entropic[:λ]
    pub risk_measure: Option<String>,
    /// Paths of the out-of-sample evaluation; defaults to `n_paths`
    pub evaluation_paths: Option<usize>,
}

impl TrainingSettings {
    /// Validated trainer configuration.
    pub fn config(&self) -> Result<TrainingConfig> {
        self.config_with_paths(self.n_paths, self.seed)
    }

    /// Configuration of the out-of-sample evaluation batch, seeded apart
    /// from the training stream.
    pub fn evaluation_config(&self) -> Result<TrainingConfig> {
        self.config_with_paths(
            self.evaluation_paths.unwrap_or(self.n_paths),
            self.evaluation_seed(),
        )
    }

    /// Seed used for evaluation batches, if any.
    pub fn evaluation_seed(&self) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(1))
    }

    /// Untrained policy of `kind` (the configured one if `None`).
    pub fn policy(&self, kind: Option<PolicyKind>) -> Result<HedgingPolicy> {
        Ok(match kind.unwrap_or(self.policy) {
            PolicyKind::Linear => HedgingPolicy::linear(),
            PolicyKind::Mlp => HedgingPolicy::mlp(
                self.hidden_units.unwrap_or(DEFAULT_HIDDEN_UNITS),
                self.seed.unwrap_or_default(),
            )?,
        })
    }

    fn config_with_paths(&self, n_paths: usize, seed: Option<u64>) -> Result<TrainingConfig> {
        let mut builder = TrainingConfig::builder()
            .n_paths(n_paths)
            .n_steps(self.n_steps)
            .antithetic(self.use_antithetic);
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        if let Some(optimizer) = self.optimizer_type {
            builder = builder.optimizer_type(optimizer);
        }
        if let Some(lr) = self.learning_rate {
            builder = builder.learning_rate(lr);
        }
        if let Some(n) = self.max_iterations {
            builder = builder.max_iterations(n);
        }
        if let Some(tol) = self.convergence_tolerance {
            builder = builder.convergence_tolerance(tol);
        }
        if let Some(window) = self.convergence_window {
            builder = builder.convergence_window(window);
        }
        if let Some(max) = self.max_grad_norm {
            builder = builder.max_grad_norm(Some(max));
        }
        if self.clip_gradients == Some(false) {
            builder = builder.max_grad_norm(None);
        }
        if let Some(rate) = self.transaction_cost_rate {
            builder = builder.transaction_cost_rate(rate);
        }
        if let Some(measure) = &self.risk_measure {
            builder = builder.risk_measure(measure.parse::<RiskMeasure>()?);
        }
        Ok(builder.build()?)
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| CliError::InvalidArgument(format!("missing setting '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_pricing::path_dependent::PayoffKind;

    const BASE: &str = r#"
[model]
process_type = "gbm"
spot = 100.0
volatility = 0.2
rate = 0.03

[payoff]
payoff_type = "european"
option_type = "call"
strike = 100.0
maturity = 1.0

[simulation]
n_paths = 1000
n_steps = 10
seed = 7
"#;

    #[test]
    fn test_minimal_settings() {
        let settings = Settings::from_toml(BASE).unwrap();
        let params = settings.model.parameters().unwrap();
        assert_eq!(params.process_type(), ProcessType::Gbm);
        assert_eq!(params.n_assets(), 1);

        let payoff = settings.payoff.payoff().unwrap();
        assert_eq!(payoff.kind, PayoffKind::European);

        let config = settings.simulation.config().unwrap();
        assert_eq!(config.n_paths(), 1000);
        assert_eq!(config.seed(), Some(7));
        assert_eq!(config.greek_mode(), GreekMode::Autodiff);
        assert!(settings.training.is_none());
        assert!(settings.training().is_err());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let text = BASE.replace("rate = 0.03\n", "");
        assert!(matches!(
            Settings::from_toml(&text),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_heston_requires_its_parameters() {
        let text = BASE.replace("\"gbm\"", "\"heston\"");
        let settings = Settings::from_toml(&text).unwrap();
        assert!(matches!(
            settings.model.parameters(),
            Err(CliError::InvalidArgument(_))
        ));

        let text = text.replace(
            "rate = 0.03\n",
            "rate = 0.03\nmean_reversion = 2.0\nlong_run_variance = 0.04\nvol_of_vol = 0.3\ncorrelation = -0.7\n",
        );
        let settings = Settings::from_toml(&text).unwrap();
        let params = settings.model.parameters().unwrap();
        assert_eq!(params.process_type(), ProcessType::Heston);
    }

    #[test]
    fn test_basket_with_correlation_and_fixed_rate() {
        let text = BASE
            .replace("spot = 100.0", "spot = [100.0, 50.0]")
            .replace(
                "volatility = 0.2",
                "volatility = [0.2, 0.3]\nasset_correlation = [1.0, 0.5, 0.5, 1.0]\nfixed = [\"rate\"]",
            );
        let settings = Settings::from_toml(&text).unwrap();
        let params = settings.model.parameters().unwrap();
        assert_eq!(params.n_assets(), 2);
        assert!(params.correlation_matrix().is_some());
        assert!(params.check_differentiable(ParameterName::Rate).is_err());
    }

    #[test]
    fn test_unknown_fixed_parameter_rejected() {
        let text = BASE.replace("rate = 0.03", "rate = 0.03\nfixed = [\"beta\"]");
        let settings = Settings::from_toml(&text).unwrap();
        assert!(matches!(
            settings.model.parameters(),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_barrier_payoff() {
        let text = BASE.replace(
            "payoff_type = \"european\"",
            "payoff_type = \"barrier\"\nbarrier_type = \"up-out\"\nbarrier = 130.0\nsmoothing_width = 0.5",
        );
        let settings = Settings::from_toml(&text).unwrap();
        let payoff = settings.payoff.payoff().unwrap();
        assert_eq!(
            payoff.kind,
            PayoffKind::Barrier {
                barrier_type: BarrierType::UpOut,
                barrier: 130.0
            }
        );
        assert_eq!(payoff.smoothing_width, Some(0.5));

        let text = BASE.replace("payoff_type = \"european\"", "payoff_type = \"barrier\"");
        let settings = Settings::from_toml(&text).unwrap();
        assert!(settings.payoff.payoff().is_err());
    }

    #[test]
    fn test_simulation_options() {
        let text = BASE.replace(
            "seed = 7",
            "seed = 7\nuse_antithetic = true\ngreek_mode = \"finite-difference\"\nsmoothing_width = 0.25\nschedule = [0.0, 0.5, 1.0]\n\n[simulation.bumps]\nspot_relative = 0.02",
        );
        let settings = Settings::from_toml(&text).unwrap();
        let config = settings.simulation.config().unwrap();
        assert!(config.antithetic());
        assert_eq!(config.greek_mode(), GreekMode::FiniteDifference);
        assert_eq!(config.smoothing_width(), 0.25);
        assert_eq!(config.bumps().spot_relative, 0.02);
        assert_eq!(config.bumps().rate, BumpConfig::default().rate);
        assert!(settings.simulation.engine().is_ok());
    }

    #[test]
    fn test_calendar_schedule() {
        let text = format!(
            "{}\n[simulation.calendar]\nvaluation_date = \"2025-01-01\"\nobservation_dates = [\"2025-07-02\", \"2026-01-01\"]\nday_count = \"ACT/365\"\n",
            BASE
        );
        let settings = Settings::from_toml(&text).unwrap();
        let calendar = settings.simulation.calendar.as_ref().unwrap();
        assert_eq!(calendar.observation_dates.len(), 2);
        let engine = settings.simulation.engine().unwrap();
        let payoff = settings.payoff.payoff().unwrap();
        let grid = engine.time_grid(&payoff).unwrap();
        assert_eq!(grid.n_steps(), 2);
        assert!((grid.maturity() - 1.0).abs() < 1e-12);

        let mut both = settings.simulation.clone();
        both.schedule = Some(vec![0.0, 1.0]);
        assert!(matches!(both.engine(), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_simulation_rejected() {
        let text = BASE.replace("n_paths = 1000", "n_paths = 0");
        let settings = Settings::from_toml(&text).unwrap();
        assert!(matches!(
            settings.simulation.config(),
            Err(CliError::Pricing(PricingError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_training_settings() {
        let text = format!(
            "{}\n[training]\nn_paths = 500\nn_steps = 20\nseed = 3\noptimizer_type = \"sgd\"\nlearning_rate = 0.05\nrisk_measure = \"expected-shortfall:0.9\"\nclip_gradients = false\npolicy = \"mlp\"\nhidden_units = 4\nevaluation_paths = 2000\n",
            BASE
        );
        let settings = Settings::from_toml(&text).unwrap();
        let training = settings.training().unwrap();
        let config = training.config().unwrap();
        assert_eq!(config.optimizer_type(), OptimizerType::Sgd);
        assert_eq!(config.learning_rate(), 0.05);
        assert_eq!(config.max_grad_norm(), None);
        assert_eq!(
            config.risk_measure(),
            RiskMeasure::ExpectedShortfall { level: 0.9 }
        );
        assert_eq!(config.max_iterations(), 200);

        let eval = training.evaluation_config().unwrap();
        assert_eq!(eval.n_paths(), 2000);
        assert_eq!(eval.seed(), Some(4));

        let policy = training.policy(None).unwrap();
        assert_eq!(policy.n_params(), 5 * 4 + 1);
        assert_eq!(
            training.policy(Some(PolicyKind::Linear)).unwrap().n_params(),
            4
        );
    }

    #[test]
    fn test_bad_risk_measure_rejected() {
        let text = format!(
            "{}\n[training]\nn_paths = 500\nn_steps = 20\nrisk_measure = \"sharpe\"\n",
            BASE
        );
        let settings = Settings::from_toml(&text).unwrap();
        assert!(matches!(
            settings.training().unwrap().config(),
            Err(CliError::Optimiser(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_rejected() {
        assert!(matches!(
            Settings::load(Some("does/not/exist.toml")),
            Err(CliError::FileNotFound(_))
        ));
    }
}
