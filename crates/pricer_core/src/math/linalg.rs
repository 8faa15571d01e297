//! Small dense least-squares routines.
//!
//! Used by regressions with a handful of regressors (Longstaff-Schwartz
//! continuation values, factor-model betas). Matrices are row-major
//! `Vec<Vec<f64>>`; problems here never exceed a few dozen columns so no
//! BLAS backend is involved.

/// Pivots below this magnitude are treated as singular.
const PIVOT_EPSILON: f64 = 1e-30;

/// Solve `A x = b` for symmetric positive definite `A` via Cholesky.
///
/// Returns `None` if `A` is not square of the same size as `b`, or is not
/// numerically positive definite.
///
/// # Examples
/// ```
/// use pricer_core::math::linalg::solve_cholesky;
///
/// let a = vec![vec![4.0, 2.0], vec![2.0, 2.0]];
/// let x = solve_cholesky(&a, &[8.0, 5.0]).unwrap();
/// assert!((x[0] - 1.5).abs() < 1e-12);
/// assert!((x[1] - 1.0).abs() < 1e-12);
/// ```
pub fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = a[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                if !(sum > PIVOT_EPSILON) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum = b[i] - (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = sum / l[i][i];
    }

    // Lᵀ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = y[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }

    Some(x)
}

/// Gram matrix `XᵀX` of a row-major design matrix with `n_cols` columns.
pub fn gram(design: &[Vec<f64>], n_cols: usize) -> Vec<Vec<f64>> {
    let mut xtx = vec![vec![0.0; n_cols]; n_cols];
    for row in design {
        for i in 0..n_cols {
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n_cols {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }
    xtx
}

/// Ordinary least squares `argmin_β ‖Xβ − y‖²` via the normal equations.
///
/// `design` holds one row per observation. Returns `None` when the rows
/// have inconsistent lengths, the observation counts differ, or `XᵀX` is
/// singular (fewer independent observations than regressors).
///
/// # Examples
/// ```
/// use pricer_core::math::linalg::least_squares;
///
/// // y = 1 + 2x
/// let design: Vec<Vec<f64>> = (0..5).map(|i| vec![1.0, i as f64]).collect();
/// let y: Vec<f64> = (0..5).map(|i| 1.0 + 2.0 * i as f64).collect();
/// let beta = least_squares(&design, &y).unwrap();
/// assert!((beta[0] - 1.0).abs() < 1e-10);
/// assert!((beta[1] - 2.0).abs() < 1e-10);
/// ```
pub fn least_squares(design: &[Vec<f64>], targets: &[f64]) -> Option<Vec<f64>> {
    let n_cols = design.first()?.len();
    if design.len() != targets.len() || design.iter().any(|row| row.len() != n_cols) {
        return None;
    }

    let xtx = gram(design, n_cols);
    let mut xty = vec![0.0; n_cols];
    for (row, &y) in design.iter().zip(targets) {
        for (acc, &x) in xty.iter_mut().zip(row) {
            *acc += x * y;
        }
    }

    solve_cholesky(&xtx, &xty)
}
