//! Linear factor model for residualising asset returns.
//!
//! Given asset returns `R` (assets × steps) and factor returns `F`
//! (factors × steps), the loadings solve the least-squares problem
//!
//! ```text
//! β = argmin ‖Fᵀ β − Rᵀ‖²        (β is factors × assets)
//! ```
//!
//! and the residual (idiosyncratic) returns are `R − βᵀ F`. Residualised
//! returns are used as hedging-instrument inputs when factor exposure
//! should be stripped out.

use pricer_core::math::linalg::{gram, solve_cholesky};
use pricer_core::types::PricingError;
use thiserror::Error;

/// Factor model errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FactorModelError {
    /// Returns and factors cover different numbers of time steps.
    #[error("Step count mismatch: returns have {returns} steps, factors have {factors}")]
    StepCountMismatch {
        /// Steps in the return series
        returns: usize,
        /// Steps in the factor series
        factors: usize,
    },

    /// A series had no rows or no steps.
    #[error("Empty input: {0}")]
    Empty(&'static str),

    /// Rows of one input have different lengths.
    #[error("Ragged input: {0} rows have inconsistent lengths")]
    Ragged(&'static str),

    /// Input shape does not match the fitted loadings.
    #[error("Shape mismatch: expected {expected} {what}, got {got}")]
    ShapeMismatch {
        /// Which dimension disagreed
        what: &'static str,
        /// Dimension of the fitted loadings
        expected: usize,
        /// Dimension supplied
        got: usize,
    },

    /// Factor series are collinear or too short to identify the loadings.
    #[error("Singular factor Gram matrix: {n_factors} factors over {n_steps} steps")]
    Singular {
        /// Number of factors
        n_factors: usize,
        /// Number of time steps
        n_steps: usize,
    },
}

impl From<FactorModelError> for PricingError {
    fn from(err: FactorModelError) -> Self {
        PricingError::InvalidModelParameters(err.to_string())
    }
}

/// Returns the common row length, rejecting empty or ragged input.
fn series_shape(rows: &[Vec<f64>], name: &'static str) -> Result<usize, FactorModelError> {
    let n_steps = rows.first().map(Vec::len).ok_or(FactorModelError::Empty(name))?;
    if n_steps == 0 {
        return Err(FactorModelError::Empty(name));
    }
    if rows.iter().any(|r| r.len() != n_steps) {
        return Err(FactorModelError::Ragged(name));
    }
    Ok(n_steps)
}

/// Fitted linear factor model.
///
/// # Examples
/// ```
/// use pricer_models::factor::FactorModel;
///
/// let factor = vec![vec![0.01, -0.02, 0.015, 0.0, -0.005]];
/// // asset = 2 × factor + idiosyncratic noise
/// let noise = [0.001, -0.002, 0.0, 0.003, -0.001];
/// let asset: Vec<f64> = factor[0].iter().zip(noise).map(|(f, e)| 2.0 * f + e).collect();
///
/// let model = FactorModel::fit(&[asset.clone()], &factor).unwrap();
/// assert!((model.beta()[0][0] - 2.0).abs() < 0.2);
///
/// let residual = model.residualise(&[asset], &factor).unwrap();
/// assert_eq!(residual[0].len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FactorModel {
    /// Loadings, `beta[factor][asset]`.
    beta: Vec<Vec<f64>>,
}

impl FactorModel {
    /// Fits loadings of `returns` (assets × steps) on `factors` (factors × steps).
    ///
    /// # Errors
    /// - `StepCountMismatch` if the two series differ in length
    /// - `Empty` / `Ragged` for malformed input
    /// - `Singular` if the factors do not identify the loadings
    pub fn fit(returns: &[Vec<f64>], factors: &[Vec<f64>]) -> Result<Self, FactorModelError> {
        let return_steps = series_shape(returns, "returns")?;
        let factor_steps = series_shape(factors, "factors")?;
        if return_steps != factor_steps {
            return Err(FactorModelError::StepCountMismatch {
                returns: return_steps,
                factors: factor_steps,
            });
        }

        let n_factors = factors.len();
        let n_steps = factor_steps;

        // Design matrix: one row per time step.
        let design: Vec<Vec<f64>> = (0..n_steps)
            .map(|t| factors.iter().map(|f| f[t]).collect())
            .collect();
        let xtx = gram(&design, n_factors);

        let singular = FactorModelError::Singular { n_factors, n_steps };
        let mut beta = vec![vec![0.0; returns.len()]; n_factors];
        for (a, asset) in returns.iter().enumerate() {
            let xty: Vec<f64> = factors
                .iter()
                .map(|f| f.iter().zip(asset).map(|(x, y)| x * y).sum())
                .collect();
            let loadings = solve_cholesky(&xtx, &xty).ok_or_else(|| singular.clone())?;
            for (row, b) in beta.iter_mut().zip(loadings) {
                row[a] = b;
            }
        }

        Ok(Self { beta })
    }

    /// Fits and residualises the same sample in one call.
    pub fn fit_residualise(
        returns: &[Vec<f64>],
        factors: &[Vec<f64>],
    ) -> Result<(Self, Vec<Vec<f64>>), FactorModelError> {
        let model = Self::fit(returns, factors)?;
        let residual = model.residualise(returns, factors)?;
        Ok((model, residual))
    }

    /// Loadings matrix, indexed `[factor][asset]`.
    pub fn beta(&self) -> &[Vec<f64>] {
        &self.beta
    }

    /// Number of factors.
    pub fn n_factors(&self) -> usize {
        self.beta.len()
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.beta.first().map_or(0, Vec::len)
    }

    /// Strips the factor component: `returns − βᵀ · factors`.
    pub fn residualise(
        &self,
        returns: &[Vec<f64>],
        factors: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>, FactorModelError> {
        let return_steps = series_shape(returns, "returns")?;
        let factor_steps = series_shape(factors, "factors")?;
        if return_steps != factor_steps {
            return Err(FactorModelError::StepCountMismatch {
                returns: return_steps,
                factors: factor_steps,
            });
        }
        if returns.len() != self.n_assets() {
            return Err(FactorModelError::ShapeMismatch {
                what: "assets",
                expected: self.n_assets(),
                got: returns.len(),
            });
        }
        if factors.len() != self.n_factors() {
            return Err(FactorModelError::ShapeMismatch {
                what: "factors",
                expected: self.n_factors(),
                got: factors.len(),
            });
        }

        let residual = returns
            .iter()
            .enumerate()
            .map(|(a, asset)| {
                (0..return_steps)
                    .map(|t| {
                        let explained: f64 = self
                            .beta
                            .iter()
                            .zip(factors)
                            .map(|(b, f)| b[a] * f[t])
                            .sum();
                        asset[t] - explained
                    })
                    .collect()
            })
            .collect();
        Ok(residual)
    }
}
