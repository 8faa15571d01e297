//! Lookback option payoffs.
//!
//! - **Fixed strike call**: max(S_max − K, 0)
//! - **Fixed strike put**: max(K − S_min, 0)
//! - **Floating strike call**: S_T − S_min
//! - **Floating strike put**: S_max − S_T
//!
//! Extrema include the spot at inception. Floating-strike payoffs are
//! non-negative on every path and need no smoothing.

use std::fmt;
use std::str::FromStr;

use num_traits::Float;

use super::{OptionType, PathDependentPayoff, PathObserver};

/// Strike convention of a lookback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LookbackType {
    /// Contract strike against the favourable extremum.
    #[default]
    Fixed,
    /// Terminal value against the unfavourable extremum.
    Floating,
}

impl fmt::Display for LookbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookbackType::Fixed => "fixed",
            LookbackType::Floating => "floating",
        })
    }
}

impl FromStr for LookbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(LookbackType::Fixed),
            "floating" => Ok(LookbackType::Floating),
            _ => Err(format!("Unknown lookback type: {}", s)),
        }
    }
}

/// Lookback option.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookbackPayoff {
    /// Strike convention.
    pub lookback_type: LookbackType,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price (fixed strike only).
    pub strike: f64,
    /// Smoothing width (0 = exact).
    pub width: f64,
}

impl<T: Float> PathDependentPayoff<T> for LookbackPayoff {
    fn compute(&self, observer: &PathObserver<T>) -> T {
        let strike = T::from(self.strike).unwrap();
        let width = T::from(self.width).unwrap();
        match (self.lookback_type, self.option_type) {
            (LookbackType::Fixed, OptionType::Call) => {
                OptionType::Call.payoff(observer.maximum(), strike, width)
            }
            (LookbackType::Fixed, OptionType::Put) => {
                OptionType::Put.payoff(observer.minimum(), strike, width)
            }
            (LookbackType::Floating, OptionType::Call) => observer.terminal() - observer.minimum(),
            (LookbackType::Floating, OptionType::Put) => observer.maximum() - observer.terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payoff(lookback_type: LookbackType, option_type: OptionType) -> LookbackPayoff {
        LookbackPayoff {
            lookback_type,
            option_type,
            strike: 100.0,
            width: 0.0,
        }
    }

    #[test]
    fn test_lookback_values() {
        let obs = PathObserver::from_prices(&[100.0, 120.0, 90.0, 105.0]);
        assert_eq!(payoff(LookbackType::Fixed, OptionType::Call).compute(&obs), 20.0);
        assert_eq!(payoff(LookbackType::Fixed, OptionType::Put).compute(&obs), 10.0);
        assert_eq!(payoff(LookbackType::Floating, OptionType::Call).compute(&obs), 15.0);
        assert_eq!(payoff(LookbackType::Floating, OptionType::Put).compute(&obs), 15.0);
    }

    #[test]
    fn test_lookback_dominates_european() {
        let obs = PathObserver::from_prices(&[100.0, 130.0, 95.0, 110.0]);
        let lookback: f64 = payoff(LookbackType::Fixed, OptionType::Call).compute(&obs);
        assert!(lookback >= OptionType::Call.payoff(110.0, 100.0, 0.0));
    }

    #[test]
    fn test_floating_non_negative() {
        let obs = PathObserver::from_prices(&[100.0, 80.0, 70.0]);
        let v: f64 = payoff(LookbackType::Floating, OptionType::Call).compute(&obs);
        assert!(v >= 0.0);
    }
}
