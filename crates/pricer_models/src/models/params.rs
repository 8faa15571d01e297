//! Named model parameter registry.
//!
//! [`ModelParameters`] maps each [`ParameterName`] to a [`Parameter`]: one
//! or more `f64` components plus a differentiable/fixed tag. It is the single
//! description of a model shared by pricing, finite-difference bumping and
//! the dual-number passes of the sensitivity extractor, which turn it into a
//! [`ProcessModel<T>`] through [`ModelParameters::lift`].
//!
//! Maturity is not stored here: it comes from the time grid and is always
//! differentiable.
//!
//! # Examples
//!
//! ```
//! use pricer_models::models::params::{ModelParameters, ParameterName};
//!
//! let params = ModelParameters::gbm(100.0, 0.2, 0.05).fixed(ParameterName::Rate);
//! assert!(params.validate().is_ok());
//! assert!(params.check_differentiable(ParameterName::Spot).is_ok());
//! assert!(params.check_differentiable(ParameterName::Rate).is_err());
//! ```

use pricer_core::traits::Float;
use pricer_core::types::PricingError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::correlation::CorrelationMatrix;
use super::gbm::{GbmModel, GbmParams};
use super::heston::{HestonModel, HestonParams};
use super::local_vol::{LocalVolModel, LocalVolParams};
use super::model_enum::ProcessModel;

/// Process family selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ProcessType {
    /// Geometric Brownian Motion
    #[default]
    Gbm,
    /// Heston stochastic volatility
    Heston,
    /// Parametric local volatility
    LocalVol,
}

impl ProcessType {
    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Gbm => "gbm",
            ProcessType::Heston => "heston",
            ProcessType::LocalVol => "local-vol",
        }
    }

    /// Parameters that must be present for this process.
    pub fn required_parameters(&self) -> &'static [ParameterName] {
        use ParameterName::*;
        match self {
            ProcessType::Gbm => &[Spot, Volatility, Rate],
            ProcessType::Heston => &[
                Spot,
                Volatility,
                Rate,
                MeanReversion,
                LongRunVariance,
                VolOfVol,
                Correlation,
            ],
            ProcessType::LocalVol => &[Spot, Volatility, Rate, Skew, Smile],
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "gbm" => Ok(ProcessType::Gbm),
            "heston" => Ok(ProcessType::Heston),
            "local-vol" | "localvol" => Ok(ProcessType::LocalVol),
            _ => Err(format!("Unknown process type: {}", s)),
        }
    }
}

/// Name of a model input that sensitivities can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ParameterName {
    /// Initial asset price(s)
    Spot,
    /// Volatility level(s)
    Volatility,
    /// Risk-free rate
    Rate,
    /// Time to maturity (taken from the time grid)
    Maturity,
    /// Heston mean reversion speed
    MeanReversion,
    /// Heston long-run variance
    LongRunVariance,
    /// Heston volatility of variance
    VolOfVol,
    /// Heston spot/variance correlation
    Correlation,
    /// Local volatility skew coefficient
    Skew,
    /// Local volatility smile coefficient
    Smile,
}

impl ParameterName {
    /// Registry key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterName::Spot => "spot",
            ParameterName::Volatility => "volatility",
            ParameterName::Rate => "rate",
            ParameterName::Maturity => "maturity",
            ParameterName::MeanReversion => "mean_reversion",
            ParameterName::LongRunVariance => "long_run_variance",
            ParameterName::VolOfVol => "vol_of_vol",
            ParameterName::Correlation => "correlation",
            ParameterName::Skew => "skew",
            ParameterName::Smile => "smile",
        }
    }

    /// Whether the parameter has one component per asset.
    pub fn is_per_asset(&self) -> bool {
        matches!(self, ParameterName::Spot | ParameterName::Volatility)
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spot" => Ok(ParameterName::Spot),
            "volatility" | "vol" => Ok(ParameterName::Volatility),
            "rate" => Ok(ParameterName::Rate),
            "maturity" => Ok(ParameterName::Maturity),
            "mean_reversion" | "kappa" => Ok(ParameterName::MeanReversion),
            "long_run_variance" | "theta" => Ok(ParameterName::LongRunVariance),
            "vol_of_vol" | "xi" => Ok(ParameterName::VolOfVol),
            "correlation" | "rho" => Ok(ParameterName::Correlation),
            "skew" => Ok(ParameterName::Skew),
            "smile" => Ok(ParameterName::Smile),
            _ => Err(format!("Unknown parameter: {}", s)),
        }
    }
}

/// One registry entry: its components and whether it may be differentiated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    /// Components (one for scalars, one per asset for per-asset parameters)
    pub values: Vec<f64>,
    /// False when the parameter is held fixed
    pub differentiable: bool,
}

impl Parameter {
    /// Differentiable scalar.
    pub fn scalar(value: f64) -> Self {
        Self {
            values: vec![value],
            differentiable: true,
        }
    }

    /// Differentiable vector.
    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            values,
            differentiable: true,
        }
    }

    /// First component.
    #[inline]
    pub fn value(&self) -> f64 {
        self.values[0]
    }
}

/// Named mapping of model inputs, the process type, and an optional
/// (always fixed) correlation matrix between assets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelParameters {
    process: ProcessType,
    entries: BTreeMap<ParameterName, Parameter>,
    correlation_matrix: Option<CorrelationMatrix>,
}

impl ModelParameters {
    /// Empty registry for a process; populate with [`ModelParameters::with`].
    pub fn new(process: ProcessType) -> Self {
        Self {
            process,
            entries: BTreeMap::new(),
            correlation_matrix: None,
        }
    }

    /// Single-asset GBM.
    pub fn gbm(spot: f64, volatility: f64, rate: f64) -> Self {
        Self::new(ProcessType::Gbm)
            .with(ParameterName::Spot, Parameter::scalar(spot))
            .with(ParameterName::Volatility, Parameter::scalar(volatility))
            .with(ParameterName::Rate, Parameter::scalar(rate))
    }

    /// Multi-asset GBM with an optional correlation matrix (identity if `None`).
    pub fn gbm_basket(
        spots: Vec<f64>,
        volatilities: Vec<f64>,
        rate: f64,
        correlation: Option<CorrelationMatrix>,
    ) -> Self {
        let mut params = Self::new(ProcessType::Gbm)
            .with(ParameterName::Spot, Parameter::vector(spots))
            .with(ParameterName::Volatility, Parameter::vector(volatilities))
            .with(ParameterName::Rate, Parameter::scalar(rate));
        params.correlation_matrix = correlation;
        params
    }

    /// Heston model; `volatility` is the initial instantaneous volatility.
    #[allow(clippy::too_many_arguments)]
    pub fn heston(
        spot: f64,
        volatility: f64,
        rate: f64,
        mean_reversion: f64,
        long_run_variance: f64,
        vol_of_vol: f64,
        correlation: f64,
    ) -> Self {
        Self::new(ProcessType::Heston)
            .with(ParameterName::Spot, Parameter::scalar(spot))
            .with(ParameterName::Volatility, Parameter::scalar(volatility))
            .with(ParameterName::Rate, Parameter::scalar(rate))
            .with(ParameterName::MeanReversion, Parameter::scalar(mean_reversion))
            .with(
                ParameterName::LongRunVariance,
                Parameter::scalar(long_run_variance),
            )
            .with(ParameterName::VolOfVol, Parameter::scalar(vol_of_vol))
            .with(ParameterName::Correlation, Parameter::scalar(correlation))
    }

    /// Parametric local volatility model.
    pub fn local_vol(spot: f64, volatility: f64, rate: f64, skew: f64, smile: f64) -> Self {
        Self::new(ProcessType::LocalVol)
            .with(ParameterName::Spot, Parameter::scalar(spot))
            .with(ParameterName::Volatility, Parameter::scalar(volatility))
            .with(ParameterName::Rate, Parameter::scalar(rate))
            .with(ParameterName::Skew, Parameter::scalar(skew))
            .with(ParameterName::Smile, Parameter::scalar(smile))
    }

    /// Insert or replace an entry.
    pub fn with(mut self, name: ParameterName, parameter: Parameter) -> Self {
        self.entries.insert(name, parameter);
        self
    }

    /// Attach a correlation matrix.
    pub fn with_correlation_matrix(mut self, matrix: CorrelationMatrix) -> Self {
        self.correlation_matrix = Some(matrix);
        self
    }

    /// Mark an entry as fixed (not differentiable). No-op if absent, which
    /// includes maturity since it is never a registry entry.
    pub fn fixed(mut self, name: ParameterName) -> Self {
        if let Some(p) = self.entries.get_mut(&name) {
            p.differentiable = false;
        }
        self
    }

    /// Process type.
    pub fn process_type(&self) -> ProcessType {
        self.process
    }

    /// Entry for `name`, if present.
    pub fn get(&self, name: ParameterName) -> Option<&Parameter> {
        self.entries.get(&name)
    }

    /// Iterate over all entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterName, &Parameter)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Fixed correlation matrix between assets, if any.
    pub fn correlation_matrix(&self) -> Option<&CorrelationMatrix> {
        self.correlation_matrix.as_ref()
    }

    /// Number of assets (components of `spot`).
    pub fn n_assets(&self) -> usize {
        self.get(ParameterName::Spot).map_or(0, |p| p.values.len())
    }

    /// Scalar value of the first component of `name`.
    ///
    /// # Errors
    /// `InvalidModelParameters` if the entry is missing.
    pub fn value(&self, name: ParameterName) -> Result<f64, PricingError> {
        self.get(name)
            .and_then(|p| p.values.first().copied())
            .ok_or_else(|| PricingError::InvalidModelParameters(format!("missing parameter {}", name)))
    }

    /// Entry for `name` if it exists and is tagged differentiable.
    ///
    /// # Errors
    /// `ParameterNotDifferentiable` if absent or fixed.
    pub fn check_differentiable(&self, name: ParameterName) -> Result<&Parameter, PricingError> {
        match self.get(name) {
            Some(p) if p.differentiable => Ok(p),
            Some(_) => Err(PricingError::ParameterNotDifferentiable(format!(
                "{} is fixed",
                name
            ))),
            None => Err(PricingError::ParameterNotDifferentiable(format!(
                "{} is not a parameter of the {} process",
                name, self.process
            ))),
        }
    }

    /// Copy with `component` of `name` shifted by `delta` (finite-difference bumps).
    ///
    /// # Errors
    /// `InvalidModelParameters` if the entry or component does not exist.
    pub fn bumped(
        &self,
        name: ParameterName,
        component: usize,
        delta: f64,
    ) -> Result<Self, PricingError> {
        let mut out = self.clone();
        let slot = out
            .entries
            .get_mut(&name)
            .and_then(|p| p.values.get_mut(component))
            .ok_or_else(|| {
                PricingError::InvalidModelParameters(format!("no component {}[{}]", name, component))
            })?;
        *slot += delta;
        Ok(out)
    }

    /// Validate the registry before simulation.
    ///
    /// # Errors
    /// - `NumericalInstability` for any NaN/Inf component
    /// - `InvalidModelParameters` for missing or unexpected entries, shape
    ///   mismatches, non-positive spot, negative volatility-like values,
    ///   correlation outside [-1, 1], or a correlation matrix that is
    ///   malformed or not positive semi-definite
    pub fn validate(&self) -> Result<(), PricingError> {
        for (name, p) in &self.entries {
            if let Some(i) = p.values.iter().position(|v| !v.is_finite()) {
                return Err(PricingError::NumericalInstability(format!(
                    "non-finite value {}[{}] = {}",
                    name, i, p.values[i]
                )));
            }
        }

        let required = self.process.required_parameters();
        for name in required {
            if !self.entries.contains_key(name) {
                return Err(invalid(format!("missing parameter {}", name)));
            }
        }
        for (name, p) in &self.entries {
            if !required.contains(name) {
                return Err(invalid(format!(
                    "parameter {} is not used by the {} process",
                    name, self.process
                )));
            }
            if p.values.is_empty() {
                return Err(invalid(format!("parameter {} has no values", name)));
            }
            if !name.is_per_asset() && p.values.len() != 1 {
                return Err(invalid(format!("parameter {} must be scalar", name)));
            }
        }

        let n_assets = self.n_assets();
        if self.process != ProcessType::Gbm && n_assets != 1 {
            return Err(invalid(format!(
                "the {} process supports a single asset, got {}",
                self.process, n_assets
            )));
        }
        let n_vols = self.entries[&ParameterName::Volatility].values.len();
        if n_vols != n_assets {
            return Err(invalid(format!(
                "{} volatilities for {} assets",
                n_vols, n_assets
            )));
        }

        for (i, s) in self.entries[&ParameterName::Spot].values.iter().enumerate() {
            if *s <= 0.0 {
                return Err(invalid(format!("spot[{}] must be positive, got {}", i, s)));
            }
        }
        for (i, v) in self.entries[&ParameterName::Volatility].values.iter().enumerate() {
            if *v < 0.0 {
                return Err(invalid(format!(
                    "volatility[{}] must be non-negative, got {}",
                    i, v
                )));
            }
        }

        if self.process == ProcessType::Heston {
            for name in [
                ParameterName::MeanReversion,
                ParameterName::LongRunVariance,
                ParameterName::VolOfVol,
            ] {
                let v = self.value(name)?;
                if v < 0.0 {
                    return Err(invalid(format!("{} must be non-negative, got {}", name, v)));
                }
            }
            let rho = self.value(ParameterName::Correlation)?;
            if !(-1.0..=1.0).contains(&rho) {
                return Err(invalid(format!("correlation must be in [-1, 1], got {}", rho)));
            }
        }

        if let Some(matrix) = &self.correlation_matrix {
            if self.process != ProcessType::Gbm {
                return Err(invalid(format!(
                    "correlation matrix is not supported by the {} process",
                    self.process
                )));
            }
            if matrix.dim() != n_assets {
                return Err(invalid(format!(
                    "correlation matrix dimension {} does not match {} assets",
                    matrix.dim(),
                    n_assets
                )));
            }
            matrix.cholesky()?;
        }

        Ok(())
    }

    /// Validate and build a process model in scalar type `T`.
    ///
    /// `seed(name, component, value)` maps every registry component to `T`.
    /// Sensitivity passes use it to attach derivative directions to the
    /// components being differentiated; all other components should map to
    /// constants.
    pub fn lift<T, F>(&self, seed: F) -> Result<ProcessModel<T>, PricingError>
    where
        T: Float,
        F: Fn(ParameterName, usize, f64) -> T,
    {
        self.validate()?;

        let scalar = |name: ParameterName| -> Result<T, PricingError> {
            Ok(seed(name, 0, self.value(name)?))
        };
        let vector = |name: ParameterName| -> Vec<T> {
            self.entries[&name]
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| seed(name, i, *v))
                .collect()
        };

        let model = match self.process {
            ProcessType::Gbm => {
                let cholesky = match &self.correlation_matrix {
                    Some(m) if m.dim() > 1 => Some(m.cholesky()?),
                    _ => None,
                };
                ProcessModel::Gbm(GbmModel::new(
                    GbmParams {
                        spots: vector(ParameterName::Spot),
                        volatilities: vector(ParameterName::Volatility),
                        rate: scalar(ParameterName::Rate)?,
                    },
                    cholesky,
                ))
            }
            ProcessType::Heston => ProcessModel::Heston(HestonModel::new(HestonParams {
                spot: scalar(ParameterName::Spot)?,
                volatility: scalar(ParameterName::Volatility)?,
                rate: scalar(ParameterName::Rate)?,
                mean_reversion: scalar(ParameterName::MeanReversion)?,
                long_run_variance: scalar(ParameterName::LongRunVariance)?,
                vol_of_vol: scalar(ParameterName::VolOfVol)?,
                correlation: scalar(ParameterName::Correlation)?,
            })),
            ProcessType::LocalVol => ProcessModel::LocalVol(LocalVolModel::new(LocalVolParams {
                spot: scalar(ParameterName::Spot)?,
                volatility: scalar(ParameterName::Volatility)?,
                rate: scalar(ParameterName::Rate)?,
                skew: scalar(ParameterName::Skew)?,
                smile: scalar(ParameterName::Smile)?,
            })),
        };
        Ok(model)
    }

    /// [`ModelParameters::lift`] with every component as a plain `f64`.
    pub fn lift_f64(&self) -> Result<ProcessModel<f64>, PricingError> {
        self.lift(|_, _, v| v)
    }
}

fn invalid(msg: String) -> PricingError {
    PricingError::InvalidModelParameters(msg)
}
