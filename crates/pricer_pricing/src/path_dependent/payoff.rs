//! PathDependentPayoff trait, option direction, and the European payoff.
//!
//! Per-sample payoffs read their inputs from a [`PathObserver`] fed with the
//! underlying's path. Kinks use `positive_part` and digital conditions use
//! `step` from `pricer_core::math::smoothing`: with width 0 they are exact,
//! with width > 0 they become the log-sum-exp / logistic surrogates whose
//! pathwise derivatives are informative.

use std::fmt;
use std::str::FromStr;

use num_traits::Float;
use pricer_core::math::smoothing::positive_part;

use super::PathObserver;

/// Call or put.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OptionType {
    /// Pays on the upside.
    #[default]
    Call,
    /// Pays on the downside.
    Put,
}

impl OptionType {
    /// Signed moneyness: `S − K` for calls, `K − S` for puts.
    #[inline]
    pub fn intrinsic<T: Float>(&self, underlying: T, strike: T) -> T {
        match self {
            OptionType::Call => underlying - strike,
            OptionType::Put => strike - underlying,
        }
    }

    /// `max(intrinsic, 0)`, smoothed when `width > 0`.
    #[inline]
    pub fn payoff<T: Float>(&self, underlying: T, strike: T, width: T) -> T {
        positive_part(self.intrinsic(underlying, strike), width)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        })
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            _ => Err(format!("Unknown option type: {}", s)),
        }
    }
}

/// Payoff computed from the statistics of one sample path.
///
/// Implementations hold their contract terms as `f64` and evaluate in any
/// `T: Float`, so the same payoff serves primal, dual and hyper-dual passes.
pub trait PathDependentPayoff<T: Float> {
    /// Undiscounted payoff of one path.
    fn compute(&self, observer: &PathObserver<T>) -> T;

    /// True when the exact payoff has a jump in the path (digital features).
    /// Pathwise derivatives of such payoffs need a positive smoothing width.
    fn is_discontinuous(&self) -> bool {
        false
    }
}

/// European payoff on the terminal value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EuropeanPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: f64,
    /// Smoothing width (0 = exact).
    pub width: f64,
}

impl<T: Float> PathDependentPayoff<T> for EuropeanPayoff {
    #[inline]
    fn compute(&self, observer: &PathObserver<T>) -> T {
        self.option_type.payoff(
            observer.terminal(),
            T::from(self.strike).unwrap(),
            T::from(self.width).unwrap(),
        )
    }
}
