//! Hedging policies: state features → hedge position.
//!
//! A policy owns a flat parameter vector and maps the per-step state
//! features to a position in the hedge instrument. Evaluation is generic
//! over `T: Float`; the trainer seeds one parameter at a time with a
//! `Dual64` direction and reads the objective's derivative back.
//!
//! | Policy              | Parameters             | Position                          |
//! |---------------------|------------------------|-----------------------------------|
//! | `Linear`            | 4                      | w·(x, τ, δ₋) + b                  |
//! | `Mlp`               | 5·hidden + 1           | w₂·tanh(W₁·(x, τ, δ₋) + b₁) + b₂  |
//! | `BlackScholesDelta` | 0                      | N(d₁) (call), N(d₁) − 1 (put)     |

use num_traits::Float;
use pricer_models::analytical::norm_cdf;
use pricer_pricing::path_dependent::OptionType;
use pricer_pricing::rng::PricerRng;

use crate::error::{OptimiserError, OptimiserResult};

/// Number of state features fed to a policy.
pub const N_FEATURES: usize = 3;

/// Per-step policy input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateFeatures<T> {
    /// ln(S / K), with K the payoff strike (or the initial price when the
    /// strike is not positive)
    pub log_moneyness: T,
    /// Years to the payoff maturity
    pub time_remaining: T,
    /// Position held over the previous step (0 before the first trade)
    pub previous_position: T,
}

impl<T: Copy> StateFeatures<T> {
    #[inline]
    fn as_array(&self) -> [T; N_FEATURES] {
        [
            self.log_moneyness,
            self.time_remaining,
            self.previous_position,
        ]
    }
}

/// Parametric hedging policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HedgingPolicy {
    /// Affine map of the features.
    Linear {
        /// `[w_x, w_τ, w_δ, b]`
        params: Vec<f64>,
    },
    /// One hidden tanh layer.
    Mlp {
        /// Hidden width
        hidden: usize,
        /// `[W₁ (hidden × 3, row-major), b₁ (hidden), w₂ (hidden), b₂]`
        params: Vec<f64>,
    },
    /// Closed-form Black–Scholes delta, used as a reference hedge.
    BlackScholesDelta {
        /// Volatility used in d₁
        volatility: f64,
        /// Continuously compounded rate used in d₁
        rate: f64,
        /// Call or put delta
        option_type: OptionType,
    },
}

impl HedgingPolicy {
    /// Linear policy starting from the zero hedge.
    pub fn linear() -> Self {
        HedgingPolicy::Linear {
            params: vec![0.0; N_FEATURES + 1],
        }
    }

    /// Linear policy with explicit `[w_x, w_τ, w_δ, b]`.
    ///
    /// # Errors
    /// `InvalidConfig` if `params` does not have 4 entries.
    pub fn linear_with(params: Vec<f64>) -> OptimiserResult<Self> {
        if params.len() != N_FEATURES + 1 {
            return Err(OptimiserError::InvalidConfig(format!(
                "linear policy takes {} parameters, got {}",
                N_FEATURES + 1,
                params.len()
            )));
        }
        Ok(HedgingPolicy::Linear { params })
    }

    /// MLP with `hidden` tanh units.
    ///
    /// Input weights are drawn from N(0, 1/3) with a seeded generator; the
    /// output layer starts at zero so the initial policy is the zero hedge.
    ///
    /// # Cost
    /// The policy has `5 * hidden + 1` parameters and the trainer runs one
    /// forward-mode pass over the whole hedging batch per parameter, so an
    /// iteration costs `5 * hidden + 1` full unrolls. Keep `hidden` small.
    ///
    /// # Errors
    /// `InvalidConfig` if `hidden` is zero.
    pub fn mlp(hidden: usize, seed: u64) -> OptimiserResult<Self> {
        if hidden == 0 {
            return Err(OptimiserError::InvalidConfig(
                "MLP policy needs at least one hidden unit".to_string(),
            ));
        }
        let mut rng = PricerRng::from_seed(seed);
        let scale = (1.0 / N_FEATURES as f64).sqrt();
        let mut params = vec![0.0; Self::mlp_len(hidden)];
        for w in params.iter_mut().take(hidden * N_FEATURES) {
            *w = scale * rng.gen_normal();
        }
        Ok(HedgingPolicy::Mlp { hidden, params })
    }

    /// Black–Scholes delta reference policy.
    pub fn black_scholes(volatility: f64, rate: f64, option_type: OptionType) -> Self {
        HedgingPolicy::BlackScholesDelta {
            volatility,
            rate,
            option_type,
        }
    }

    #[inline]
    fn mlp_len(hidden: usize) -> usize {
        hidden * (N_FEATURES + 2) + 1
    }

    /// Policy family name.
    pub fn name(&self) -> &'static str {
        match self {
            HedgingPolicy::Linear { .. } => "linear",
            HedgingPolicy::Mlp { .. } => "mlp",
            HedgingPolicy::BlackScholesDelta { .. } => "black-scholes-delta",
        }
    }

    /// Trainable parameters.
    pub fn params(&self) -> &[f64] {
        match self {
            HedgingPolicy::Linear { params } | HedgingPolicy::Mlp { params, .. } => params,
            HedgingPolicy::BlackScholesDelta { .. } => &[],
        }
    }

    pub(crate) fn params_mut(&mut self) -> &mut [f64] {
        match self {
            HedgingPolicy::Linear { params } | HedgingPolicy::Mlp { params, .. } => params,
            HedgingPolicy::BlackScholesDelta { .. } => &mut [],
        }
    }

    /// Number of trainable parameters.
    pub fn n_params(&self) -> usize {
        self.params().len()
    }

    /// Hedge position for `features` under the parameter vector `theta`.
    ///
    /// `theta` replaces the stored parameters so that the caller can pass
    /// dual-valued copies.
    ///
    /// # Panics
    /// Panics if `theta.len() != self.n_params()`.
    pub fn position<T: Float>(&self, theta: &[T], features: &StateFeatures<T>) -> T {
        assert_eq!(theta.len(), self.n_params());
        let x = features.as_array();
        match self {
            HedgingPolicy::Linear { .. } => x
                .iter()
                .zip(theta)
                .fold(theta[N_FEATURES], |acc, (&xi, &w)| acc + w * xi),
            HedgingPolicy::Mlp { hidden, .. } => {
                let h = *hidden;
                let (w1, rest) = theta.split_at(h * N_FEATURES);
                let (b1, rest) = rest.split_at(h);
                let (w2, b2) = rest.split_at(h);
                (0..h).fold(b2[0], |acc, j| {
                    let row = &w1[j * N_FEATURES..(j + 1) * N_FEATURES];
                    let pre = row
                        .iter()
                        .zip(&x)
                        .fold(b1[j], |a, (&w, &xi)| a + w * xi);
                    acc + w2[j] * pre.tanh()
                })
            }
            HedgingPolicy::BlackScholesDelta {
                volatility,
                rate,
                option_type,
            } => black_scholes_delta(*volatility, *rate, *option_type, features),
        }
    }

    /// Position under the stored parameters.
    pub fn position_f64(&self, features: &StateFeatures<f64>) -> f64 {
        self.position(self.params(), features)
    }

    /// Checks that every parameter is finite.
    pub fn validate(&self) -> OptimiserResult<()> {
        if let HedgingPolicy::Mlp { hidden, params } = self {
            if params.len() != Self::mlp_len(*hidden) {
                return Err(OptimiserError::InvalidConfig(format!(
                    "MLP with {} hidden units takes {} parameters, got {}",
                    hidden,
                    Self::mlp_len(*hidden),
                    params.len()
                )));
            }
        }
        if let HedgingPolicy::BlackScholesDelta { volatility, .. } = self {
            if !(volatility.is_finite() && *volatility > 0.0) {
                return Err(OptimiserError::InvalidConfig(format!(
                    "reference delta needs a positive volatility, got {}",
                    volatility
                )));
            }
        }
        if self.params().iter().any(|p| !p.is_finite()) {
            return Err(OptimiserError::InvalidConfig(
                "policy parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn black_scholes_delta<T: Float>(
    volatility: f64,
    rate: f64,
    option_type: OptionType,
    features: &StateFeatures<T>,
) -> T {
    let tau = features.time_remaining;
    let x = features.log_moneyness;
    let call_delta = if tau > T::zero() {
        let sigma = T::from(volatility).unwrap();
        let r = T::from(rate).unwrap();
        let half = T::from(0.5).unwrap();
        let d1 = (x + (r + half * sigma * sigma) * tau) / (sigma * tau.sqrt());
        norm_cdf(d1)
    } else if x > T::zero() {
        T::one()
    } else {
        T::zero()
    };
    match option_type {
        OptionType::Call => call_delta,
        OptionType::Put => call_delta - T::one(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::Dual64;
    use pricer_models::analytical::BlackScholes;

    fn features(x: f64, tau: f64, prev: f64) -> StateFeatures<f64> {
        StateFeatures {
            log_moneyness: x,
            time_remaining: tau,
            previous_position: prev,
        }
    }

    #[test]
    fn test_linear_policy() {
        let policy = HedgingPolicy::linear_with(vec![1.0, 2.0, 3.0, 0.5]).unwrap();
        let p = policy.position_f64(&features(0.1, 0.5, -0.2));
        assert_relative_eq!(p, 0.1 + 1.0 - 0.6 + 0.5, epsilon = 1e-12);
        assert_eq!(HedgingPolicy::linear().position_f64(&features(0.3, 1.0, 0.4)), 0.0);
        assert!(HedgingPolicy::linear_with(vec![1.0]).is_err());
    }

    #[test]
    fn test_mlp_layout_and_zero_start() {
        let policy = HedgingPolicy::mlp(8, 3).unwrap();
        assert_eq!(policy.n_params(), 41);
        assert!(policy.validate().is_ok());
        assert_eq!(policy.position_f64(&features(0.2, 0.7, 0.1)), 0.0);
        assert_eq!(policy, HedgingPolicy::mlp(8, 3).unwrap());
        assert!(HedgingPolicy::mlp(0, 3).is_err());
        for hidden in [1, 4, 16] {
            assert_eq!(HedgingPolicy::mlp(hidden, 0).unwrap().n_params(), 5 * hidden + 1);
        }
    }

    #[test]
    fn test_mlp_parameter_derivative_matches_fd() {
        let mut policy = HedgingPolicy::mlp(4, 11).unwrap();
        for (i, p) in policy.params_mut().iter_mut().enumerate() {
            *p += 0.05 * i as f64;
        }
        let f = features(0.1, 0.4, 0.3);
        let j = 2;
        let theta: Vec<Dual64> = policy
            .params()
            .iter()
            .enumerate()
            .map(|(i, &p)| Dual64::new(p, if i == j { 1.0 } else { 0.0 }))
            .collect();
        let fd = StateFeatures {
            log_moneyness: Dual64::new(f.log_moneyness, 0.0),
            time_remaining: Dual64::new(f.time_remaining, 0.0),
            previous_position: Dual64::new(f.previous_position, 0.0),
        };
        let ad = policy.position(&theta, &fd).eps;

        let h = 1e-6;
        let mut up = policy.params().to_vec();
        up[j] += h;
        let mut down = policy.params().to_vec();
        down[j] -= h;
        let numeric = (policy.position(&up, &f) - policy.position(&down, &f)) / (2.0 * h);
        assert_relative_eq!(ad, numeric, epsilon = 1e-7);
    }

    #[test]
    fn test_black_scholes_policy_matches_closed_form() {
        let bs = BlackScholes::new(100.0, 0.03, 0.25).unwrap();
        let call = HedgingPolicy::black_scholes(0.25, 0.03, OptionType::Call);
        let put = HedgingPolicy::black_scholes(0.25, 0.03, OptionType::Put);
        let f = features((100.0f64 / 95.0).ln(), 0.75, 0.0);
        assert_relative_eq!(call.position_f64(&f), bs.delta(95.0, 0.75, true), epsilon = 1e-6);
        assert_relative_eq!(put.position_f64(&f), bs.delta(95.0, 0.75, false), epsilon = 1e-6);
        assert_eq!(call.n_params(), 0);
        // At expiry the delta is the exercise indicator.
        assert_eq!(call.position_f64(&features(0.1, 0.0, 0.0)), 1.0);
        assert_eq!(put.position_f64(&features(0.1, 0.0, 0.0)), -1.0);
    }

    #[test]
    fn test_validate_rejects_bad_policies() {
        assert!(HedgingPolicy::black_scholes(0.0, 0.0, OptionType::Call)
            .validate()
            .is_err());
        assert!(HedgingPolicy::linear_with(vec![f64::NAN, 0.0, 0.0, 0.0])
            .unwrap()
            .validate()
            .is_err());
        let bad = HedgingPolicy::Mlp {
            hidden: 2,
            params: vec![0.0; 3],
        };
        assert!(bad.validate().is_err());
    }
}
