//! Standard normal distribution functions.
//!
//! - `norm_cdf`: Cumulative distribution function (Hart's double-precision rational approximation)
//! - `norm_pdf`: Probability density function
//!
//! All functions are generic over `T: Float` so closed-form references and
//! the delta-hedging policy can be evaluated on dual numbers.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// sqrt(2 * pi)
const SQRT_2PI: f64 = 2.506_628_274_631;

/// Beyond this distance the lower tail underflows to zero.
const TAIL_CUTOFF: f64 = 37.0;

/// Switch point between the rational and continued-fraction branches.
const BRANCH_POINT: f64 = 7.071_067_811_865_47;

const NUMERATOR: [f64; 7] = [
    3.526_249_659_989_11e-2,
    0.700_383_064_443_688,
    6.373_962_203_531_65,
    33.912_866_078_383,
    112.079_291_497_871,
    221.213_596_169_931,
    220.206_867_912_376,
];

const DENOMINATOR: [f64; 8] = [
    8.838_834_764_831_84e-2,
    1.755_667_163_182_64,
    16.064_177_579_207,
    86.780_732_202_946_1,
    296.564_248_779_674,
    637.333_633_378_831,
    793.826_512_519_948,
    440.413_735_824_752,
];

/// Lower tail `Φ(-y)` for `y >= 0`.
#[inline]
fn lower_tail<T: Float>(y: T) -> T {
    let c = |v: f64| T::from(v).unwrap();

    if y > c(TAIL_CUTOFF) {
        return T::zero();
    }

    let e = (-y * y * c(0.5)).exp();
    if y < c(BRANCH_POINT) {
        let num = NUMERATOR[1..]
            .iter()
            .fold(c(NUMERATOR[0]), |acc, &k| acc * y + c(k));
        let den = DENOMINATOR[1..]
            .iter()
            .fold(c(DENOMINATOR[0]), |acc, &k| acc * y + c(k));
        e * num / den
    } else {
        let mut b = y + c(0.65);
        for k in [4.0, 3.0, 2.0, 1.0] {
            b = y + c(k) / b;
        }
        e / b / c(SQRT_2PI)
    }
}

/// Standard normal cumulative distribution function.
///
/// Computes P(X <= x) where X ~ N(0, 1). Accurate to double precision.
///
/// # AD Compatibility
/// The branch on the sign of `x` selects between `Φ(x) = tail(-x)` and
/// `1 - tail(x)`, avoiding `abs` so the derivative at zero is `φ(0)`
/// from either side.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-15);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one() - lower_tail(x)
    } else {
        lower_tail(-x)
    }
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-10);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let half = T::from(0.5).unwrap();
    T::from(FRAC_1_SQRT_2PI).unwrap() * (-half * x * x).exp()
}
