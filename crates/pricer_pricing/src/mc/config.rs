//! Monte Carlo simulation configuration.
//!
//! Configuration types and builders for pricing runs and sensitivity passes.

use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 10_000;

/// How sensitivities are computed.
///
/// - `Autodiff`: forward-mode dual numbers (hyper-duals for second order)
///   propagated through the simulation on the pricing draws
/// - `FiniteDifference`: central bump-and-reprice with common random numbers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum GreekMode {
    /// Forward-mode automatic differentiation.
    #[default]
    Autodiff,
    /// Bump-and-reprice.
    FiniteDifference,
}

impl GreekMode {
    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GreekMode::Autodiff => "autodiff",
            GreekMode::FiniteDifference => "finite-difference",
        }
    }
}

impl fmt::Display for GreekMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GreekMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "autodiff" | "ad" => Ok(GreekMode::Autodiff),
            "finite-difference" | "fd" | "bump" => Ok(GreekMode::FiniteDifference),
            _ => Err(format!("Unknown greek mode: {}", s)),
        }
    }
}

/// Bump sizes for finite-difference sensitivities.
///
/// Spot bumps are relative to the spot level; all others are absolute.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BumpConfig {
    /// Relative spot bump (0.01 = 1% of spot).
    pub spot_relative: f64,
    /// Absolute volatility bump.
    pub volatility: f64,
    /// Absolute rate bump.
    pub rate: f64,
    /// Absolute maturity bump in years.
    pub maturity: f64,
    /// Absolute bump for every other parameter.
    pub other: f64,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            spot_relative: 0.01,
            volatility: 0.01,
            rate: 0.01,
            maturity: 1.0 / 252.0,
            other: 1e-3,
        }
    }
}

impl BumpConfig {
    /// Every bump must be positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("bumps.spot_relative", self.spot_relative),
            ("bumps.volatility", self.volatility),
            ("bumps.rate", self.rate),
            ("bumps.maturity", self.maturity),
            ("bumps.other", self.other),
        ];
        for (name, value) in fields {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value: format!("must be positive and finite, got {}", value),
                });
            }
        }
        Ok(())
    }
}

/// Monte Carlo simulation configuration.
///
/// Immutable configuration specifying simulation parameters.
/// Use [`MonteCarloConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{GreekMode, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .n_steps(252)
///     .seed(42)
///     .antithetic(true)
///     .greek_mode(GreekMode::Autodiff)
///     .smoothing_width(0.5)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert_eq!(config.n_steps(), 252);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MonteCarloConfig {
    n_paths: usize,
    n_steps: usize,
    seed: Option<u64>,
    antithetic: bool,
    greek_mode: GreekMode,
    smoothing_width: f64,
    bumps: BumpConfig,
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps per path (for uniform grids).
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Seed for reproducibility; `None` draws one from the OS.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether antithetic pairs are simulated.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Sensitivity computation mode.
    #[inline]
    pub fn greek_mode(&self) -> GreekMode {
        self.greek_mode
    }

    /// Default smoothing width in price units (0 = exact payoffs).
    #[inline]
    pub fn smoothing_width(&self) -> f64 {
        self.smoothing_width
    }

    /// Finite-difference bump sizes.
    #[inline]
    pub fn bumps(&self) -> &BumpConfig {
        &self.bumps
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_paths` is 0 or greater than 10,000,000
    /// - `n_steps` is 0 or greater than 10,000
    /// - `smoothing_width` is negative or non-finite
    /// - any bump size is not positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.n_steps == 0 || self.n_steps > MAX_STEPS {
            return Err(ConfigError::InvalidStepCount(self.n_steps));
        }
        if !(self.smoothing_width >= 0.0 && self.smoothing_width.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "smoothing_width",
                value: format!("must be non-negative and finite, got {}", self.smoothing_width),
            });
        }
        self.bumps.validate()
    }
}

/// Builder for [`MonteCarloConfig`].
///
/// `n_paths` and `n_steps` are required; everything else defaults to a
/// plain (non-antithetic) autodiff run with exact payoffs.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    n_steps: Option<usize>,
    seed: Option<u64>,
    antithetic: bool,
    greek_mode: GreekMode,
    smoothing_width: f64,
    bumps: BumpConfig,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of simulation paths, in [1, 10_000_000].
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of time steps per path, in [1, 10_000].
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables antithetic sampling.
    #[inline]
    pub fn antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Sets the sensitivity mode.
    #[inline]
    pub fn greek_mode(mut self, greek_mode: GreekMode) -> Self {
        self.greek_mode = greek_mode;
        self
    }

    /// Sets the default smoothing width (price units).
    #[inline]
    pub fn smoothing_width(mut self, width: f64) -> Self {
        self.smoothing_width = width;
        self
    }

    /// Sets the finite-difference bump sizes.
    #[inline]
    pub fn bumps(mut self, bumps: BumpConfig) -> Self {
        self.bumps = bumps;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required field is unset or any value is
    /// out of range (see [`MonteCarloConfig::validate`]).
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        let n_paths = self.n_paths.ok_or(ConfigError::InvalidParameter {
            name: "n_paths",
            value: "must be specified".to_string(),
        })?;

        let n_steps = self.n_steps.ok_or(ConfigError::InvalidParameter {
            name: "n_steps",
            value: "must be specified".to_string(),
        })?;

        let config = MonteCarloConfig {
            n_paths,
            n_steps,
            seed: self.seed,
            antithetic: self.antithetic,
            greek_mode: self.greek_mode,
            smoothing_width: self.smoothing_width,
            bumps: self.bumps,
        };

        config.validate()?;
        Ok(config)
    }
}
