//! Black-Scholes closed form for European options.
//!
//! Serves as the reference for Monte Carlo convergence tests and as the
//! delta of the reference hedging policy.
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use num_traits::Float;

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;

/// Expiries below this are treated as expired (intrinsic value).
const EXPIRY_EPSILON: f64 = 1e-10;

/// Black-Scholes model for European option pricing.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`, `Dual64`)
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
/// let call_price = bs.price_call(100.0, 1.0);
/// let put_price = bs.price_put(100.0, 1.0);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call_price - put_price - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BlackScholes<T: Float> {
    spot: T,
    rate: T,
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot <= 0
    /// - `AnalyticalError::InvalidVolatility` if volatility <= 0
    /// - `AnalyticalError::InvalidRate` if rate is not finite
    pub fn new(spot: T, rate: T, volatility: T) -> Result<Self, AnalyticalError> {
        let zero = T::zero();

        if !(spot > zero) {
            return Err(AnalyticalError::InvalidSpot {
                spot: spot.to_f64().unwrap_or(f64::NAN),
            });
        }

        if !(volatility > zero) {
            return Err(AnalyticalError::InvalidVolatility {
                volatility: volatility.to_f64().unwrap_or(f64::NAN),
            });
        }

        if !rate.is_finite() {
            return Err(AnalyticalError::InvalidRate {
                rate: rate.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(Self {
            spot,
            rate,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    #[inline]
    fn expired(expiry: T) -> bool {
        expiry <= T::from(EXPIRY_EPSILON).unwrap()
    }

    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T).
    ///
    /// Must not be called with an expired option.
    #[inline]
    pub fn d1(&self, strike: T, expiry: T) -> T {
        let half = T::from(0.5).unwrap();
        let log_moneyness = (self.spot / strike).ln();
        let drift = (self.rate + half * self.volatility * self.volatility) * expiry;
        (log_moneyness + drift) / (self.volatility * expiry.sqrt())
    }

    /// d₂ = d₁ - σ√T.
    #[inline]
    pub fn d2(&self, strike: T, expiry: T) -> T {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// European call price (intrinsic value at expiry).
    pub fn price_call(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            let intrinsic = self.spot - strike;
            return intrinsic.max(T::zero());
        }
        let discount = (-self.rate * expiry).exp();
        self.spot * norm_cdf(self.d1(strike, expiry))
            - strike * discount * norm_cdf(self.d2(strike, expiry))
    }

    /// European put price (intrinsic value at expiry).
    pub fn price_put(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            let intrinsic = strike - self.spot;
            return intrinsic.max(T::zero());
        }
        let discount = (-self.rate * expiry).exp();
        strike * discount * norm_cdf(-self.d2(strike, expiry))
            - self.spot * norm_cdf(-self.d1(strike, expiry))
    }

    /// Delta: N(d₁) for calls, N(d₁) − 1 for puts.
    pub fn delta(&self, strike: T, expiry: T, is_call: bool) -> T {
        if Self::expired(expiry) {
            let (one, zero) = (T::one(), T::zero());
            return match (is_call, self.spot > strike, self.spot < strike) {
                (true, true, _) => one,
                (false, _, true) => -one,
                _ => zero,
            };
        }
        let n_d1 = norm_cdf(self.d1(strike, expiry));
        if is_call {
            n_d1
        } else {
            n_d1 - T::one()
        }
    }

    /// Gamma = φ(d₁) / (S·σ·√T), identical for calls and puts.
    pub fn gamma(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        norm_pdf(self.d1(strike, expiry)) / (self.spot * self.volatility * expiry.sqrt())
    }

    /// Vega = S·√T·φ(d₁).
    pub fn vega(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        self.spot * expiry.sqrt() * norm_pdf(self.d1(strike, expiry))
    }

    /// Theta as calendar decay, `∂V/∂t = -∂V/∂T`.
    pub fn theta(&self, strike: T, expiry: T, is_call: bool) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        let two = T::from(2.0).unwrap();
        let d2 = self.d2(strike, expiry);
        let discount = (-self.rate * expiry).exp();
        let decay = -(self.spot * self.volatility * norm_pdf(self.d1(strike, expiry)))
            / (two * expiry.sqrt());

        if is_call {
            decay - self.rate * strike * discount * norm_cdf(d2)
        } else {
            decay + self.rate * strike * discount * norm_cdf(-d2)
        }
    }

    /// Rho = ±K·T·e^(-rT)·N(±d₂).
    pub fn rho(&self, strike: T, expiry: T, is_call: bool) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        let d2 = self.d2(strike, expiry);
        let discount = (-self.rate * expiry).exp();
        if is_call {
            strike * expiry * discount * norm_cdf(d2)
        } else {
            -strike * expiry * discount * norm_cdf(-d2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::Dual64;

    fn bs() -> BlackScholes<f64> {
        BlackScholes::new(100.0, 0.05, 0.2).unwrap()
    }

    #[test]
    fn test_reference_prices() {
        // Hull, S=100 K=100 r=5% σ=20% T=1
        assert_relative_eq!(bs().price_call(100.0, 1.0), 10.450583572185565, epsilon = 1e-9);
        assert_relative_eq!(bs().price_put(100.0, 1.0), 5.573526022256971, epsilon = 1e-9);
    }

    #[test]
    fn test_put_call_parity() {
        for k in [80.0, 100.0, 125.0] {
            let lhs = bs().price_call(k, 0.5) - bs().price_put(k, 0.5);
            let rhs = 100.0 - k * (-0.025_f64).exp();
            assert_relative_eq!(lhs, rhs, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_expired_is_intrinsic() {
        assert_eq!(bs().price_call(90.0, 0.0), 10.0);
        assert_eq!(bs().price_put(90.0, 0.0), 0.0);
        assert_eq!(bs().delta(90.0, 0.0, true), 1.0);
        assert_eq!(bs().delta(110.0, 0.0, false), -1.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            BlackScholes::new(-1.0_f64, 0.05, 0.2),
            Err(AnalyticalError::InvalidSpot { .. })
        ));
        assert!(matches!(
            BlackScholes::new(100.0_f64, 0.05, 0.0),
            Err(AnalyticalError::InvalidVolatility { .. })
        ));
    }

    #[test]
    fn test_greeks_match_dual_derivatives() {
        let k = 105.0;
        let t = 0.75;

        let spot = BlackScholes::new(Dual64::new(100.0, 1.0), Dual64::new(0.05, 0.0), Dual64::new(0.2, 0.0))
            .unwrap()
            .price_call(Dual64::new(k, 0.0), Dual64::new(t, 0.0));
        assert_relative_eq!(spot.eps, bs().delta(k, t, true), epsilon = 1e-9);

        let vol = BlackScholes::new(Dual64::new(100.0, 0.0), Dual64::new(0.05, 0.0), Dual64::new(0.2, 1.0))
            .unwrap()
            .price_call(Dual64::new(k, 0.0), Dual64::new(t, 0.0));
        assert_relative_eq!(vol.eps, bs().vega(k, t), epsilon = 1e-8);

        let rate = BlackScholes::new(Dual64::new(100.0, 0.0), Dual64::new(0.05, 1.0), Dual64::new(0.2, 0.0))
            .unwrap()
            .price_put(Dual64::new(k, 0.0), Dual64::new(t, 0.0));
        assert_relative_eq!(rate.eps, bs().rho(k, t, false), epsilon = 1e-8);

        let expiry = BlackScholes::new(Dual64::new(100.0, 0.0), Dual64::new(0.05, 0.0), Dual64::new(0.2, 0.0))
            .unwrap()
            .price_call(Dual64::new(k, 0.0), Dual64::new(t, 1.0));
        assert_relative_eq!(-expiry.eps, bs().theta(k, t, true), epsilon = 1e-8);
    }

    #[test]
    fn test_gamma_positive_and_symmetric_in_type() {
        let g = bs().gamma(100.0, 1.0);
        assert!(g > 0.0);
        let h = 1e-3;
        let fd = (bs_at(100.0 + h).delta(100.0, 1.0, false) - bs_at(100.0 - h).delta(100.0, 1.0, false))
            / (2.0 * h);
        assert_relative_eq!(fd, g, epsilon = 1e-6);
    }

    fn bs_at(spot: f64) -> BlackScholes<f64> {
        BlackScholes::new(spot, 0.05, 0.2).unwrap()
    }
}
