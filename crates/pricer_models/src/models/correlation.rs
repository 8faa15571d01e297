//! Correlation matrices and Cholesky factors for multi-asset simulation.
//!
//! ## Mathematical Background
//!
//! Given `n` independent standard normal random variables `Z = [Z1, Z2, ..., Zn]`,
//! correlated normals `W = [W1, W2, ..., Wn]` are obtained as:
//!
//! ```text
//! W = L * Z
//! ```
//!
//! where `L` is the lower triangular Cholesky factor of the correlation matrix `C`:
//! ```text
//! C = L * L^T
//! ```
//!
//! Correlation is a fixed (never differentiated) input, so the matrix and its
//! factor are plain `f64`. Positive semi-definite matrices (e.g. perfectly
//! correlated assets) are accepted: a pivot that vanishes within tolerance
//! produces a zero column.
//!
//! ## Usage
//!
//! ```
//! use pricer_models::models::correlation::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::new(&[
//!     1.0, 0.5,
//!     0.5, 1.0,
//! ], 2).unwrap();
//!
//! let cholesky = corr.cholesky().unwrap();
//! let w = cholesky.transform(&[0.5, 0.8]);
//! assert_eq!(w.len(), 2);
//! assert!((w[0] - 0.5).abs() < 1e-12);
//! ```

use pricer_core::types::PricingError;
use thiserror::Error;

/// Tolerance for diagonal, symmetry and pivot checks.
const TOLERANCE: f64 = 1e-10;

/// Error types for correlation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationError {
    /// Matrix is not positive semi-definite
    #[error("Correlation matrix is not positive semi-definite (pivot {pivot} at index {index})")]
    NotPositiveSemiDefinite {
        /// Index of the failing pivot
        index: usize,
        /// Value of the failing pivot
        pivot: f64,
    },
    /// Matrix dimensions are invalid
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected element count
        expected: usize,
        /// Actual element count
        got: usize,
    },
    /// Diagonal elements are not 1.0
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index
        index: usize,
        /// Offending value
        value: f64,
    },
    /// Matrix is not symmetric
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row
        i: usize,
        /// Column
        j: usize,
    },
    /// Correlation value out of range [-1, 1] or non-finite
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row
        i: usize,
        /// Column
        j: usize,
        /// Offending value
        value: f64,
    },
}

impl From<CorrelationError> for PricingError {
    fn from(err: CorrelationError) -> Self {
        PricingError::InvalidModelParameters(err.to_string())
    }
}

/// Validated correlation matrix.
///
/// A correlation matrix must satisfy:
/// - Square and symmetric
/// - Diagonal elements equal to 1.0
/// - Off-diagonal elements in [-1, 1]
/// - Positive semi-definite (checked by [`CorrelationMatrix::cholesky`])
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CorrelationMatrix {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
}

impl CorrelationMatrix {
    /// Create a new correlation matrix from flat array (row-major).
    ///
    /// # Errors
    /// Returns `CorrelationError` if the shape, diagonal, symmetry or range
    /// checks fail. Positive semi-definiteness is checked on factorisation.
    pub fn new(data: &[f64], dim: usize) -> Result<Self, CorrelationError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        for i in 0..dim {
            let diag = data[i * dim + i];
            if !((diag - 1.0).abs() <= TOLERANCE) {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];

                if !(-1.0..=1.0).contains(&val_ij) {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij,
                    });
                }
                if !((val_ij - val_ji).abs() <= TOLERANCE) {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Create an identity correlation matrix (no correlation).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// Get matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Compute the lower triangular factor `L` with `C = L * L^T`.
    ///
    /// # Errors
    /// `CorrelationError::NotPositiveSemiDefinite` if a pivot is negative
    /// beyond tolerance.
    pub fn cholesky(&self) -> Result<CholeskyFactor, CorrelationError> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for j in 0..n {
            let sum: f64 = (0..j).map(|k| lower[j * n + k] * lower[j * n + k]).sum();
            let pivot = self.get(j, j) - sum;
            if pivot < -TOLERANCE {
                return Err(CorrelationError::NotPositiveSemiDefinite { index: j, pivot });
            }
            let l_jj = if pivot <= TOLERANCE { 0.0 } else { pivot.sqrt() };
            lower[j * n + j] = l_jj;

            for i in (j + 1)..n {
                let sum: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();
                let residual = self.get(i, j) - sum;
                if l_jj == 0.0 {
                    // A degenerate column must leave nothing to explain.
                    if residual.abs() > 1e-8 {
                        return Err(CorrelationError::NotPositiveSemiDefinite {
                            index: j,
                            pivot,
                        });
                    }
                } else {
                    lower[i * n + j] = residual / l_jj;
                }
            }
        }

        Ok(CholeskyFactor {
            data: lower,
            dim: n,
        })
    }
}

/// Lower triangular Cholesky factor of a correlation matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// Get matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j). Returns zero for upper triangular elements.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transform independent standard normals to correlated normals, `W = L * Z`.
    ///
    /// # Panics
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let mut w = vec![0.0; self.dim];
        self.transform_into(z, &mut w);
        w
    }

    /// Write `L * Z` into `out` without allocating.
    ///
    /// # Panics
    /// Panics if `z` or `out` is shorter than `self.dim()`.
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        assert!(
            z.len() >= self.dim && out.len() >= self.dim,
            "Input vector length {} is less than matrix dimension {}",
            z.len().min(out.len()),
            self.dim
        );

        let n = self.dim;
        for i in 0..n {
            out[i] = (0..=i).map(|j| self.data[i * n + j] * z[j]).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_cholesky_is_identity() {
        let corr = CorrelationMatrix::identity(3);
        let l = corr.cholesky().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(l.get(i, j), if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_two_by_two_factor() {
        let rho = 0.6;
        let corr = CorrelationMatrix::new(&[1.0, rho, rho, 1.0], 2).unwrap();
        let l = corr.cholesky().unwrap();
        assert_relative_eq!(l.get(0, 0), 1.0, epsilon = 1e-14);
        assert_relative_eq!(l.get(1, 0), rho, epsilon = 1e-14);
        assert_relative_eq!(l.get(1, 1), (1.0 - rho * rho).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_reconstruction() {
        let data = [1.0, 0.3, -0.2, 0.3, 1.0, 0.4, -0.2, 0.4, 1.0];
        let corr = CorrelationMatrix::new(&data, 3).unwrap();
        let l = corr.cholesky().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| l.get(i, k) * l.get(j, k)).sum();
                assert_relative_eq!(v, corr.get(i, j), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_perfect_correlation_is_accepted() {
        let corr = CorrelationMatrix::new(&[1.0, 1.0, 1.0, 1.0], 2).unwrap();
        let l = corr.cholesky().unwrap();
        let w = l.transform(&[0.7, -3.0]);
        assert_relative_eq!(w[0], 0.7, epsilon = 1e-12);
        assert_relative_eq!(w[1], 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_not_positive_semi_definite() {
        // Pairwise correlations of -0.9 among three assets are infeasible.
        let data = [1.0, -0.9, -0.9, -0.9, 1.0, -0.9, -0.9, -0.9, 1.0];
        let corr = CorrelationMatrix::new(&data, 3).unwrap();
        assert!(matches!(
            corr.cholesky(),
            Err(CorrelationError::NotPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            CorrelationMatrix::new(&[1.0, 0.5, 0.5], 2),
            Err(CorrelationError::InvalidDimensions {
                expected: 4,
                got: 3
            })
        );
        assert!(matches!(
            CorrelationMatrix::new(&[0.9, 0.0, 0.0, 1.0], 2),
            Err(CorrelationError::InvalidDiagonal { index: 0, .. })
        ));
        assert_eq!(
            CorrelationMatrix::new(&[1.0, 0.5, 0.4, 1.0], 2),
            Err(CorrelationError::NotSymmetric { i: 0, j: 1 })
        );
        assert!(matches!(
            CorrelationMatrix::new(&[1.0, 1.5, 1.5, 1.0], 2),
            Err(CorrelationError::OutOfRange { .. })
        ));
        assert!(matches!(
            CorrelationMatrix::new(&[1.0, f64::NAN, f64::NAN, 1.0], 2),
            Err(CorrelationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_error_converts_to_pricing_error() {
        let err: PricingError = CorrelationError::NotSymmetric { i: 0, j: 1 }.into();
        assert!(matches!(err, PricingError::InvalidModelParameters(_)));
    }
}
